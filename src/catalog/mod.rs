//! Catalog collaborators
//!
//! Traits for the local store and the external client, plus the two
//! implementations shipped with the crate: a static local table and a
//! GraphQL client for the external service.

pub mod http;
pub mod static_store;
pub mod traits;

pub use http::HttpCatalogClient;
pub use static_store::{LocalCatalogDocument, StaticCatalogStore, SubCategoryRow};
pub use traits::{CatalogError, CatalogFilter, ExternalCatalogClient, LocalCatalogStore, StoreError};
