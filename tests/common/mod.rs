#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use school_directory::api::{self, AppState};
use school_directory::db::SchoolStore;
use school_directory::error::{DirectoryError, Result};
use school_directory::models::SchoolSummary;
use school_directory::storage::LocalImageStore;
use school_directory::validation::SchoolForm;

pub const BOUNDARY: &str = "school-directory-test-boundary";

/// In-memory `SchoolStore` with switches for simulating failures.
#[derive(Default)]
pub struct MemorySchoolStore {
    rows: Mutex<Vec<(i64, SchoolForm, String)>>,
    next_id: AtomicI64,
    offline: AtomicBool,
    fail_inserts: AtomicBool,
}

impl MemorySchoolStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check_online(&self, operation: &'static str) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DirectoryError::ConnectionFailed {
                operation,
                database: "memory".to_string(),
                cause: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SchoolStore for MemorySchoolStore {
    async fn insert(&self, school: &SchoolForm, image: &str) -> Result<i64> {
        self.check_online("adding school to database")?;

        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DirectoryError::QueryFailed {
                operation: "adding school to database",
                cause: "duplicate key value violates unique constraint".to_string(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows
            .lock()
            .unwrap()
            .push((id, school.clone(), image.to_string()));
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<SchoolSummary>> {
        self.check_online("fetching schools")?;

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|(id, school, image)| SchoolSummary {
                id: *id,
                name: school.name.clone(),
                address: school.address.clone(),
                city: school.city.clone(),
                image: image.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> bool {
        self.check_online("checking database").is_ok()
    }
}

pub struct TestApp {
    pub router: Router,
    pub schools: Arc<MemorySchoolStore>,
    pub upload_dir: PathBuf,
    _temp: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let upload_dir = temp.path().join("schoolImages");

        let schools = Arc::new(MemorySchoolStore::default());
        let images = Arc::new(LocalImageStore::new(&upload_dir, "/schoolImages"));

        let state = Arc::new(AppState::new(schools.clone(), images));
        let router = api::router(state, 8 * 1024 * 1024);

        Self {
            router,
            schools,
            upload_dir,
            _temp: temp,
        }
    }

    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_school(&self, body: Vec<u8>) -> Response<Body> {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/addSchool")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub struct ImagePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

pub fn jpeg(file_name: &str) -> ImagePart<'_> {
    ImagePart {
        file_name,
        content_type: "image/jpeg",
        data: &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
    }
}

/// The example record from the directory's documentation.
pub fn green_valley() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Green Valley High"),
        ("address", "123 Main St"),
        ("city", "Springfield"),
        ("state", "IL"),
        ("contact", "1234567890"),
        ("email_id", "a@b.com"),
    ]
}

pub fn multipart_body(fields: &[(&str, &str)], image: Option<ImagePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some(image) = image {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                image.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", image.content_type).as_bytes());
        body.extend_from_slice(image.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
