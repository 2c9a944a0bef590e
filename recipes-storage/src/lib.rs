//! Recipes Storage - Record Store and Listing Cache
//!
//! Defines the two external collaborators of the service as async traits,
//! in-memory implementations of both, the Redis listing cache, and the
//! cache-aside policy that ties them together. The PostgreSQL record store
//! lives in recipes-api.

pub mod cache;
pub mod store;

pub use cache::{
    CacheAsideListing, CacheStats, InMemoryListingCache, ListingCache, RedisListingCache,
    DEFAULT_LISTING_KEY,
};
pub use store::{InMemoryRecordStore, RecordStore};
