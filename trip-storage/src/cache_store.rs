//! TTL cache over SQLite: one table per domain, upsert writes keyed on
//! `(cache_key, provider_source)`, expiry checked at read time.

use crate::error::StorageError;
use crate::rate_limiter::RateLimiter;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache data domains; each has its own table and default TTL, reflecting how
/// fast the underlying real-world value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDomain {
    Weather,
    Cultural,
    Currency,
}

impl CacheDomain {
    pub const fn table(self) -> &'static str {
        match self {
            CacheDomain::Weather => "weather_cache",
            CacheDomain::Cultural => "cultural_cache",
            CacheDomain::Currency => "currency_cache",
        }
    }

    pub const fn default_ttl(self) -> Duration {
        match self {
            CacheDomain::Weather => Duration::from_secs(3600),
            CacheDomain::Cultural => Duration::from_secs(86_400),
            CacheDomain::Currency => Duration::from_secs(3600),
        }
    }
}

/// Cache-aside store. Reads never return a stale payload; writes upsert so
/// repeated refreshes for the same key do not accumulate rows. Entries are
/// never deleted explicitly (passive expiry only).
#[derive(Clone)]
pub struct CacheStore {
    pool: SqlitePool,
    limiter: Arc<RateLimiter>,
}

impl CacheStore {
    /// Opens (creating if missing) the cache database and its three tables.
    /// Accepts any SQLite URL, including `sqlite::memory:` for tests.
    pub async fn new(database_url: &str, limiter: RateLimiter) -> Result<Self, StorageError> {
        info!(database_url = %database_url, "Opening cache store");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::Database(e.to_string()))?
            .create_if_missing(true);
        // A single connection keeps in-memory databases coherent across calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            limiter: Arc::new(limiter),
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), StorageError> {
        for domain in [
            CacheDomain::Weather,
            CacheDomain::Cultural,
            CacheDomain::Currency,
        ] {
            let ddl = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    cache_key TEXT NOT NULL,
                    provider_source TEXT NOT NULL,
                    payload TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    expires_at TEXT NOT NULL,
                    PRIMARY KEY (cache_key, provider_source)
                )
                "#,
                domain.table()
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Looks up the newest row for `key`/`source`. Misses when absent, when
    /// `expires_at` has passed, or when the storage layer or rate limiter
    /// rejects the read. Never returns a stale payload.
    pub async fn get(&self, domain: CacheDomain, key: &str, source: &str) -> Option<Value> {
        if !self.limiter.acquire("read") {
            warn!(table = domain.table(), key = %key, "Cache read rejected by rate limiter");
            return None;
        }
        match self.fetch(domain, key, source).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(table = domain.table(), key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn fetch(
        &self,
        domain: CacheDomain,
        key: &str,
        source: &str,
    ) -> Result<Option<Value>, StorageError> {
        let query = format!(
            "SELECT payload, expires_at FROM {} \
             WHERE cache_key = ? AND provider_source = ? \
             ORDER BY created_at DESC LIMIT 1",
            domain.table()
        );
        let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(&query)
            .bind(key)
            .bind(source)
            .fetch_optional(&self.pool)
            .await?;

        let Some((payload, expires_at)) = row else {
            debug!(table = domain.table(), key = %key, "Cache miss");
            return Ok(None);
        };
        if Utc::now() >= expires_at {
            debug!(table = domain.table(), key = %key, "Cache entry expired");
            return Ok(None);
        }
        match serde_json::from_str(&payload) {
            Ok(value) => {
                debug!(table = domain.table(), key = %key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(table = domain.table(), key = %key, error = %e, "Cache payload unparseable");
                Ok(None)
            }
        }
    }

    /// Upserts `payload` under `key`/`source` with `expires_at = now + ttl`
    /// (domain default TTL when `ttl` is None). Returns false instead of
    /// erroring on storage failure or rate-limit rejection.
    pub async fn set(
        &self,
        domain: CacheDomain,
        key: &str,
        source: &str,
        payload: &Value,
        ttl: Option<Duration>,
    ) -> bool {
        if !self.limiter.acquire("write") {
            warn!(table = domain.table(), key = %key, "Cache write rejected by rate limiter");
            return false;
        }
        match self.upsert(domain, key, source, payload, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(table = domain.table(), key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    async fn upsert(
        &self,
        domain: CacheDomain,
        key: &str,
        source: &str,
        payload: &Value,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let created_at = Utc::now();
        let ttl = ttl.unwrap_or_else(|| domain.default_ttl());
        let expires_at = created_at
            + chrono::Duration::from_std(ttl)
                .map_err(|e| StorageError::Database(e.to_string()))?;

        let query = format!(
            "INSERT INTO {} (cache_key, provider_source, payload, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (cache_key, provider_source) DO UPDATE SET \
             payload = excluded.payload, \
             created_at = excluded.created_at, \
             expires_at = excluded.expires_at",
            domain.table()
        );
        sqlx::query(&query)
            .bind(key)
            .bind(source)
            .bind(payload.to_string())
            .bind(created_at)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        debug!(table = domain.table(), key = %key, ttl_secs = ttl.as_secs(), "Cache entry written");
        Ok(())
    }

    /// Number of rows in a domain table, expired or not.
    pub async fn entry_count(&self, domain: CacheDomain) -> Result<i64, StorageError> {
        let query = format!("SELECT COUNT(*) FROM {}", domain.table());
        let count: (i64,) = sqlx::query_as(&query).fetch_one(&self.pool).await?;
        Ok(count.0)
    }
}
