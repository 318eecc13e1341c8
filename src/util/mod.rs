//! Generic utility wrappers: bounded retry and a TTL response cache

pub mod cache;
pub mod retry;

pub use cache::ApiCache;
pub use retry::{with_retry, RetryPolicy};
