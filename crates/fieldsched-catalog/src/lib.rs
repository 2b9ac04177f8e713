//! Company profile catalog.
//!
//! [`ProfileStore`] is the seam to whatever holds the profiles: the hosted
//! store, a local JSON file, or memory. [`CachedCatalog`] sits in front of a
//! store for callers that read the catalog repeatedly.

pub mod cache;
pub mod error;
pub mod store;

pub use cache::{CachedCatalog, DEFAULT_CATALOG_TTL};
pub use error::{Result, StoreError};
pub use store::{
    JsonFileStore, MemoryStore, ProfileStore, active_in_order, apply_upsert, catalog_order,
};
