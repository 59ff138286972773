use crate::config::Config;
use deadpool_postgres::{Config as PoolConfig, Object, Pool, PoolError, Runtime};
use std::time::Duration;
use thiserror::Error;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../../migrations/001_create_schools.sql");

/// Errors surfaced by [`Database`]; both carry the driver's own error.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("could not acquire a connection to {database}: {source}")]
    Connection {
        database: String,
        #[source]
        source: PoolError,
    },

    #[error(transparent)]
    Query(#[from] tokio_postgres::Error),
}

/// Thin client over a lazily-initialised connection pool.
///
/// Every call acquires a connection for the duration of one statement and
/// hands it back when the call returns, on success or error.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
    name: String,
}

impl Database {
    /// Build the pool. No connection is opened until the first statement.
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url, config.max_connections)?;

        Ok(Self {
            pool,
            name: config.database_name.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn client(&self) -> Result<Object, DbError> {
        self.pool.get().await.map_err(|source| DbError::Connection {
            database: self.name.clone(),
            source,
        })
    }

    pub async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, DbError> {
        let client = self.client().await?;
        debug!("Executing statement with {} params", params.len());
        Ok(client.execute(sql, params).await?)
    }

    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, DbError> {
        let client = self.client().await?;
        Ok(client.query(sql, params).await?)
    }

    pub async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, DbError> {
        let client = self.client().await?;
        Ok(client.query_one(sql, params).await?)
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        self.execute("SELECT 1", &[]).await.map(|_| ())
    }

    /// Create the `schools` table if it is not there yet.
    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        let client = self.client().await?;
        client.batch_execute(SCHEMA).await?;

        info!("Schema ready in database {}", self.name);
        Ok(())
    }
}

fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<Pool> {
    let mut cfg = PoolConfig::new();
    cfg.url = Some(database_url.to_string());

    cfg.pool = Some(deadpool_postgres::PoolConfig {
        max_size: max_size as usize,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(5)),
            recycle: Some(Duration::from_secs(5)),
        },
        ..Default::default()
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| anyhow::anyhow!("Failed to create pool: {}", e))
}
