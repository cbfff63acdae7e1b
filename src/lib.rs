//! Taxonomy Mapper - Cross-system identifier mapping cache
//!
//! Maps the local curriculum taxonomy (program, subject, category,
//! sub-category, age, grade) onto the external catalog service's ids. The
//! two catalogs share nothing but entity names, so the mapper resolves by
//! exact name within the right external scope, memoizes every result, and
//! falls back to configured defaults when no counterpart exists.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Consumers: migration jobs, integration services                │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Mapper                                   │
//! │     per-kind caches, organization policy, fallback policy       │
//! └─────────────────────────────────────────────────────────────────┘
//!                 │                               │
//!                 ▼                               ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────────┐
//! │      LocalCatalogStore        │ │    ExternalCatalogClient      │
//! │   (static table, database)    │ │     (GraphQL over HTTP)       │
//! └───────────────────────────────┘ └───────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use taxonomy_mapper::{HttpCatalogClient, Mapper, MapperConfig, Operator, StaticCatalogStore};
//!
//! let config = MapperConfig::from_file("config/mapper.yaml")?;
//! let client = Arc::new(HttpCatalogClient::new(&config.external)?);
//! let store = Arc::new(StaticCatalogStore::from_file("config/local_catalog.yaml")?);
//!
//! let operator = Operator::new(org_id, user_id, token);
//! let mapper = Mapper::new(operator, client, store, &config);
//!
//! let cancel = CancellationToken::new();
//! let subject = mapper.subject(&cancel, org_id, "program2", "subject1").await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod mapper;
pub mod policy;
pub mod taxonomy;

// Re-export main types
pub use catalog::{
    CatalogError, CatalogFilter, ExternalCatalogClient, HttpCatalogClient, LocalCatalogStore,
    StaticCatalogStore, StoreError,
};
pub use config::{ConfigError, MapperConfig};
pub use error::{MapperError, Result};
pub use mapper::{map_joined, Mapper, ScopeState};
pub use policy::{FallbackPolicy, OrganizationPolicy, OrganizationType};
pub use taxonomy::{CatalogEntry, Operator, TaxonomyKind};
pub use tokio_util::sync::CancellationToken;
