//! SQLite record store (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use syncache_core::error::CoordinatorError;
use syncache_core::ports::RecordStore;
use syncache_types::Record;

pub struct Database {
    pool: Arc<SqlitePool>,
    op_timeout: Duration,
}

impl Database {
    /// Open the database, creating the file and schema as needed. Every
    /// subsequent store call is bounded by `op_timeout`; a timed-out call
    /// surfaces as a store error with no partial effect, since nothing
    /// was committed.
    pub async fn new(database_path: &str, op_timeout: Duration) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
            op_timeout,
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS info (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                create_time DATETIME DEFAULT CURRENT_TIMESTAMP,
                update_time DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Insert a new row with a caller-assigned id, returning the stored
    /// record with its store-assigned timestamps.
    pub async fn create_record(&self, id: i64, name: &str) -> syncache_core::Result<Record> {
        let pool = self.pool.clone();
        let name = name.to_string();
        let row = self
            .bounded("record insert", async move {
                sqlx::query(
                    r#"
                    INSERT INTO info (id, name) VALUES (?1, ?2)
                    "#,
                )
                .bind(id)
                .bind(&name)
                .execute(&*pool)
                .await?;

                let row: RecordRow = sqlx::query_as(
                    r#"
                    SELECT id, name, create_time, update_time FROM info WHERE id = ?1
                    "#,
                )
                .bind(id)
                .fetch_one(&*pool)
                .await?;
                Ok(row)
            })
            .await?;

        Ok(row.into())
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> syncache_core::Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(|e| CoordinatorError::Store(e.to_string())),
            Err(_) => Err(CoordinatorError::Store(format!(
                "{} timed out after {:?}",
                what, self.op_timeout
            ))),
        }
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn get(&self, id: i64) -> syncache_core::Result<Option<Record>> {
        let pool = self.pool.clone();
        let row = self
            .bounded("record read", async move {
                let row: Option<RecordRow> = sqlx::query_as(
                    r#"
                    SELECT id, name, create_time, update_time FROM info WHERE id = ?1
                    "#,
                )
                .bind(id)
                .fetch_optional(&*pool)
                .await?;
                Ok(row)
            })
            .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn update(&self, id: i64, name: &str) -> syncache_core::Result<Record> {
        let pool = self.pool.clone();
        let name = name.to_string();
        // Update and read-back run in one transaction so the returned row
        // is exactly the committed state.
        let row = self
            .bounded("record update", async move {
                let mut tx = pool.begin().await?;

                let done = sqlx::query(
                    r#"
                    UPDATE info SET name = ?1, update_time = datetime('now')
                    WHERE id = ?2
                    "#,
                )
                .bind(&name)
                .bind(id)
                .execute(&mut *tx)
                .await?;

                if done.rows_affected() == 0 {
                    tx.rollback().await?;
                    return Ok(None);
                }

                let row: RecordRow = sqlx::query_as(
                    r#"
                    SELECT id, name, create_time, update_time FROM info WHERE id = ?1
                    "#,
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

                tx.commit().await?;
                Ok(Some(row))
            })
            .await?;

        row.map(|r| r.into()).ok_or(CoordinatorError::NotFound(id))
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    name: String,
    create_time: chrono::DateTime<chrono::Utc>,
    update_time: chrono::DateTime<chrono::Utc>,
}

impl From<RecordRow> for Record {
    fn from(r: RecordRow) -> Self {
        Record {
            id: r.id,
            name: r.name,
            create_time: r.create_time,
            update_time: r.update_time,
        }
    }
}
