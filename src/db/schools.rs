use crate::db::client::{Database, DbError};
use crate::error::{DirectoryError, Result};
use crate::models::SchoolSummary;
use crate::validation::SchoolForm;
use async_trait::async_trait;
use tracing::debug;

const INSERT_SCHOOL: &str = "INSERT INTO schools (name, address, city, state, contact, image, email_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id";

const SELECT_SCHOOLS: &str = "SELECT id, name, address, city, image FROM schools";

/// Persistence for school records.
#[async_trait]
pub trait SchoolStore: Send + Sync {
    /// Insert a record and return its newly assigned id.
    async fn insert(&self, school: &SchoolForm, image: &str) -> Result<i64>;

    /// Every stored school, in whatever order the store yields them.
    async fn list(&self) -> Result<Vec<SchoolSummary>>;

    /// Whether the backing store is reachable.
    async fn ping(&self) -> bool;
}

pub struct PgSchoolStore {
    db: Database,
}

impl PgSchoolStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_err(&self, operation: &'static str, err: DbError) -> DirectoryError {
        match err {
            DbError::Connection { database, source } => DirectoryError::ConnectionFailed {
                operation,
                database,
                cause: source.to_string(),
            },
            DbError::Query(e) => DirectoryError::QueryFailed {
                operation,
                cause: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl SchoolStore for PgSchoolStore {
    async fn insert(&self, school: &SchoolForm, image: &str) -> Result<i64> {
        let row = self
            .db
            .query_one(
                INSERT_SCHOOL,
                &[
                    &school.name,
                    &school.address,
                    &school.city,
                    &school.state,
                    &school.contact,
                    &image,
                    &school.email_id,
                ],
            )
            .await
            .map_err(|e| self.map_err("adding school to database", e))?;

        let id: i64 = row.get(0);
        debug!("Inserted school {} into {}", id, self.db.name());
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<SchoolSummary>> {
        let rows = self
            .db
            .query(SELECT_SCHOOLS, &[])
            .await
            .map_err(|e| self.map_err("fetching schools", e))?;

        Ok(rows
            .iter()
            .map(|row| SchoolSummary {
                id: row.get("id"),
                name: row.get("name"),
                address: row.get("address"),
                city: row.get("city"),
                image: row.get("image"),
            })
            .collect())
    }

    async fn ping(&self) -> bool {
        self.db.ping().await.is_ok()
    }
}
