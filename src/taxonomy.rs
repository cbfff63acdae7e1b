//! Shared taxonomy vocabulary
//!
//! Both catalogs describe the same six kinds of curriculum entity and hand
//! them back as flat `{id, name}` pairs, so one entry type serves the local
//! and the external side alike.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The curriculum taxonomy kinds known to both catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Program,
    Subject,
    /// Called "Developmental" in the local catalog
    Category,
    /// Called "Skill" in the local catalog; scoped by its parent category
    SubCategory,
    Age,
    Grade,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 6] = [
        TaxonomyKind::Program,
        TaxonomyKind::Subject,
        TaxonomyKind::Category,
        TaxonomyKind::SubCategory,
        TaxonomyKind::Age,
        TaxonomyKind::Grade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyKind::Program => "program",
            TaxonomyKind::Subject => "subject",
            TaxonomyKind::Category => "category",
            TaxonomyKind::SubCategory => "sub_category",
            TaxonomyKind::Age => "age",
            TaxonomyKind::Grade => "grade",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaxonomyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "program" => Ok(TaxonomyKind::Program),
            "subject" => Ok(TaxonomyKind::Subject),
            "category" | "developmental" => Ok(TaxonomyKind::Category),
            "sub_category" | "subcategory" | "skill" => Ok(TaxonomyKind::SubCategory),
            "age" => Ok(TaxonomyKind::Age),
            "grade" => Ok(TaxonomyKind::Grade),
            other => Err(format!("unknown taxonomy kind '{}'", other)),
        }
    }
}

/// A single `{id, name}` entry from either catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The identity every external catalog call is made on behalf of.
///
/// External responses are scoped by the organization behind the token, so a
/// mapper is built for exactly one operator.
#[derive(Clone)]
pub struct Operator {
    pub org_id: String,
    pub user_id: String,
    token: String,
}

impl Operator {
    pub fn new(
        org_id: impl Into<String>,
        user_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            org_id: org_id.into(),
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

// Keep the credential out of logs.
impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("org_id", &self.org_id)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_local_aliases() {
        assert_eq!(
            "developmental".parse::<TaxonomyKind>().unwrap(),
            TaxonomyKind::Category
        );
        assert_eq!(
            "skill".parse::<TaxonomyKind>().unwrap(),
            TaxonomyKind::SubCategory
        );
        assert!("semester".parse::<TaxonomyKind>().is_err());
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in TaxonomyKind::ALL {
            assert_eq!(kind.to_string().parse::<TaxonomyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_operator_debug_redacts_token() {
        let op = Operator::new("org-1", "user-1", "secret-token");
        let rendered = format!("{:?}", op);
        assert!(rendered.contains("org-1"));
        assert!(!rendered.contains("secret-token"));
    }
}
