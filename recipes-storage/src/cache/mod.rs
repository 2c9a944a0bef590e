//! Listing cache layer.
//!
//! [`ListingCache`] is the key-value seam, with in-memory and Redis
//! backends. [`CacheAsideListing`] is the policy that keeps the cached
//! listing and the record store consistent.

pub mod cache_aside;
pub mod memory;
pub mod redis_backend;
pub mod traits;

pub use cache_aside::{CacheAsideListing, DEFAULT_LISTING_KEY};
pub use memory::InMemoryListingCache;
pub use redis_backend::RedisListingCache;
pub use traits::{CacheStats, ListingCache};
