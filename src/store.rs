use crate::models::Link;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

/// Errors from the link store.
///
/// `NotFound` is a business-level outcome the caller translates into a
/// presentation (usually 404). `Database` is an infrastructure fault and is
/// never masked as a business result.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no link record for identifier {0}")]
    NotFound(i64),
    #[error("storage error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The persistent URL-to-identifier mapping, injected into every handler.
///
/// Implementations must tolerate arbitrary interleavings of all three
/// operations from concurrent callers, and an identifier returned by
/// [`insert_or_get`](LinkStore::insert_or_get) must be immediately visible
/// to [`lookup`](LinkStore::lookup) from any other caller.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Store `url` and return its identifier, reusing the existing one if
    /// the URL is already present (dedup-on-insert).
    ///
    /// The uniqueness constraint on the URL column is the sole concurrency
    /// control: the insert is attempted optimistically, and only after a
    /// uniqueness conflict is observed does the fallback lookup run. Two
    /// concurrent submissions of the same URL therefore always converge on
    /// one identifier.
    async fn insert_or_get(&self, url: &str) -> Result<i64, StoreError>;

    /// The long URL for `id`, or [`StoreError::NotFound`] if that
    /// identifier was never issued.
    async fn lookup(&self, id: i64) -> Result<String, StoreError>;

    /// Append a hit event for an identifier known to exist.
    ///
    /// Callers treat this as best-effort accounting: a failure here must be
    /// logged and swallowed, never allowed to fail the redirect itself.
    async fn record_hit(&self, id: i64, ip: &str, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// SQLite-backed [`LinkStore`].
///
/// Table layout matches the store this service has always run against:
/// `urls(id, url UNIQUE)` plus an append-only `hits(id, url_id, ip,
/// access_time)` log keyed by its own surrogate id.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and create, on first run) the database at `database_url` and
    /// ensure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(
                database_url
                    .parse::<SqliteConnectOptions>()?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .foreign_keys(true),
            )
            .await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Create the backing tables if they do not exist yet.
    ///
    /// Runs on every startup; repeated runs against an existing store are
    /// no-ops and never touch existing data.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query("CREATE TABLE IF NOT EXISTS urls ( id INTEGER NOT NULL PRIMARY KEY, url TEXT UNIQUE )")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS hits
             (
             id INTEGER NOT NULL PRIMARY KEY,
             url_id INTEGER NOT NULL,
             ip TEXT NOT NULL,
             access_time INTEGER NOT NULL,
             FOREIGN KEY(url_id) REFERENCES urls(id)
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Total hits recorded for one identifier.
    pub async fn hit_count(&self, id: i64) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hits WHERE url_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn insert_or_get(&self, url: &str) -> Result<i64, StoreError> {
        let inserted = sqlx::query("INSERT INTO urls (url) VALUES (?1)")
            .bind(url)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                // The constraint fired, so the row exists; re-read its id.
                let link: Link = sqlx::query_as("SELECT id, url FROM urls WHERE url = ?1")
                    .bind(url)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(link.id)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn lookup(&self, id: i64) -> Result<String, StoreError> {
        let link: Option<Link> = sqlx::query_as("SELECT id, url FROM urls WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        link.map(|l| l.url).ok_or(StoreError::NotFound(id))
    }

    async fn record_hit(&self, id: i64, ip: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO hits (url_id, ip, access_time) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(ip)
            .bind(at.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
