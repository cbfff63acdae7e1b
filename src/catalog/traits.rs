//! Collaborator traits for the two catalogs
//!
//! The mapper never talks to a database or the network directly. It asks a
//! `LocalCatalogStore` for local entities and an `ExternalCatalogClient` for
//! external ones, so either side can be swapped for a static table or a
//! counting stub.

use async_trait::async_trait;

use crate::taxonomy::{CatalogEntry, Operator, TaxonomyKind};

/// Filter applied to a local catalog query
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Restrict to these ids (empty means no restriction)
    pub ids: Vec<String>,
    /// Restrict to children of this parent (sub-categories only)
    pub parent_id: Option<String>,
}

impl CatalogFilter {
    /// Filter matching a single id
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
            parent_id: None,
        }
    }

    /// Narrow the filter to children of `parent_id`
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Source of local taxonomy entities
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait LocalCatalogStore: Send + Sync {
    /// Return every entry of `kind` that passes `filter`
    async fn query(
        &self,
        kind: TaxonomyKind,
        filter: &CatalogFilter,
    ) -> Result<Vec<CatalogEntry>, StoreError>;
}

/// The external catalog service
///
/// Every call is one network round trip and is scoped by the operator's
/// credential.
#[async_trait]
pub trait ExternalCatalogClient: Send + Sync {
    async fn programs_by_organization(
        &self,
        operator: &Operator,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn subjects_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn categories_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn ages_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn grades_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn sub_categories_by_category(
        &self,
        operator: &Operator,
        category_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// Errors raised by an external catalog client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Remote error: {0}")]
    Remote(String),
    #[error("Response missing data for {0}")]
    MissingData(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Errors raised by a local catalog store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Local catalog query failed: {0}")]
    QueryFailed(String),
    #[error("Local catalog unavailable")]
    Unavailable,
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}
