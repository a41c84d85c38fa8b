//! TTL cache storage for provider payloads, plus the in-process rate limiter.
//!
//! One SQLite table per cache domain (weather, cultural insights, currency
//! rates), upsert-based writes keyed on `(cache_key, provider_source)`, and
//! expiry checked at read time. Caching is an optimization only: every
//! storage failure degrades to a miss or a no-op, never an error for callers.

mod cache_store;
mod error;
mod rate_limiter;

pub use cache_store::{CacheDomain, CacheStore};
pub use error::StorageError;
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
