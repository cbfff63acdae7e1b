//! Error types for mapping operations

use crate::catalog::{CatalogError, StoreError};
use crate::taxonomy::TaxonomyKind;

/// Main error type for the mapper
///
/// Unknown local ids are not errors: they resolve to fallback defaults.
/// `NotFound` is reserved for gaps in the fallback chain and for ages, which
/// have no default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapperError {
    #[error("External catalog failure: {0}")]
    Upstream(#[from] CatalogError),

    #[error("No {kind} mapping for '{key}'")]
    NotFound { kind: TaxonomyKind, key: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Local catalog failure: {0}")]
    LocalStore(#[from] StoreError),
}

impl MapperError {
    pub fn not_found(kind: TaxonomyKind, key: impl Into<String>) -> Self {
        MapperError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Whether a later call with the same arguments may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MapperError::Upstream(_) | MapperError::Cancelled | MapperError::LocalStore(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = MapperError::not_found(TaxonomyKind::Age, "program2:age9");
        assert_eq!(err.to_string(), "No age mapping for 'program2:age9'");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_upstream_wraps_catalog_error() {
        let err: MapperError = CatalogError::Unauthorized("expired".to_string()).into();
        assert!(err.is_retryable());
        assert_eq!(
            err,
            MapperError::Upstream(CatalogError::Unauthorized("expired".to_string()))
        );
    }
}
