//! Service Layer
//!
//! Record operations and listing-cache invalidation, kept out of the
//! HTTP handlers.

mod recipe_service;

pub use recipe_service::*;
