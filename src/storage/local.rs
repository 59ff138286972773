use super::{ImageStore, StoredImage};
use crate::error::{DirectoryError, Result};
use crate::models::ImageUpload;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

pub struct LocalImageStore {
    upload_dir: PathBuf,
    public_path: String,
}

impl LocalImageStore {
    pub fn new(upload_dir: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_path: public_path.into(),
        }
    }

    fn reference_for(&self, filename: &str) -> String {
        format!("{}/{}", self.public_path.trim_end_matches('/'), filename)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn store(&self, upload: &ImageUpload) -> Result<StoredImage> {
        fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            DirectoryError::storage(format!(
                "Failed to create upload directory {:?}: {}",
                self.upload_dir, e
            ))
        })?;

        let filename = unique_filename(&upload.file_name);
        let path = self.upload_dir.join(&filename);

        // create_new: an existing file is never overwritten
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| DirectoryError::storage(format!("Failed to create {:?}: {}", path, e)))?;

        write_or_discard(&path, file, &upload.data).await?;

        info!("Stored image {} ({} bytes)", filename, upload.data.len());

        Ok(StoredImage {
            reference: self.reference_for(&filename),
            handle: path.to_string_lossy().into_owned(),
        })
    }

    async fn remove(&self, stored: &StoredImage) -> Result<()> {
        fs::remove_file(&stored.handle).await?;
        debug!("Removed image {}", stored.handle);
        Ok(())
    }
}

/// Write `data` to the freshly created `path`. On failure the partly written
/// file is removed before the error is returned.
async fn write_or_discard<W>(path: &Path, mut file: W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = file.write_all(data).await;
    if written.is_ok() {
        written = file.flush().await;
    }
    drop(file);

    if let Err(e) = written {
        if let Err(remove_err) = fs::remove_file(path).await {
            warn!("Failed to remove partial image {:?}: {}", path, remove_err);
        }
        return Err(DirectoryError::storage(format!(
            "Failed to write {:?}: {}",
            path, e
        )));
    }

    Ok(())
}

/// `{unix_millis}-{random}-{original name}` with the original reduced to its
/// last path component and spaces replaced.
fn unique_filename(original: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..=1_000_000_000);
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        suffix,
        sanitize_filename(original)
    )
}

fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .replace(' ', "_");

    if base.is_empty() || base == "." || base == ".." {
        "image".to_string()
    } else {
        base
    }
}
