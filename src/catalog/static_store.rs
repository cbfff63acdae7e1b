//! In-memory local catalog
//!
//! The local taxonomy is small and mostly fixed, so a static table loaded
//! from YAML is enough to serve it.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use super::traits::{CatalogFilter, LocalCatalogStore, StoreError};
use crate::config::ConfigError;
use crate::taxonomy::{CatalogEntry, TaxonomyKind};

/// A sub-category row, carrying its parent category id
#[derive(Debug, Clone, Deserialize)]
pub struct SubCategoryRow {
    pub id: String,
    pub name: String,
    pub parent: String,
}

/// On-disk layout of a local catalog file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalCatalogDocument {
    #[serde(default)]
    pub programs: Vec<CatalogEntry>,
    #[serde(default)]
    pub subjects: Vec<CatalogEntry>,
    #[serde(default)]
    pub categories: Vec<CatalogEntry>,
    #[serde(default)]
    pub sub_categories: Vec<SubCategoryRow>,
    #[serde(default)]
    pub ages: Vec<CatalogEntry>,
    #[serde(default)]
    pub grades: Vec<CatalogEntry>,
}

#[derive(Debug, Clone)]
struct Row {
    entry: CatalogEntry,
    parent: Option<String>,
}

/// `LocalCatalogStore` serving a fixed table per taxonomy kind
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogStore {
    rows: HashMap<TaxonomyKind, Vec<Row>>,
}

impl StaticCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry of `kind`
    pub fn insert(&mut self, kind: TaxonomyKind, entry: CatalogEntry) -> &mut Self {
        self.rows
            .entry(kind)
            .or_default()
            .push(Row { entry, parent: None });
        self
    }

    /// Add a sub-category under `parent_category_id`
    pub fn insert_sub_category(
        &mut self,
        parent_category_id: impl Into<String>,
        entry: CatalogEntry,
    ) -> &mut Self {
        self.rows
            .entry(TaxonomyKind::SubCategory)
            .or_default()
            .push(Row {
                entry,
                parent: Some(parent_category_id.into()),
            });
        self
    }

    pub fn from_document(doc: LocalCatalogDocument) -> Self {
        let mut store = Self::new();
        let plain = [
            (TaxonomyKind::Program, doc.programs),
            (TaxonomyKind::Subject, doc.subjects),
            (TaxonomyKind::Category, doc.categories),
            (TaxonomyKind::Age, doc.ages),
            (TaxonomyKind::Grade, doc.grades),
        ];
        for (kind, entries) in plain {
            for entry in entries {
                store.insert(kind, entry);
            }
        }
        for row in doc.sub_categories {
            store.insert_sub_category(row.parent, CatalogEntry::new(row.id, row.name));
        }
        store
    }

    /// Load a catalog from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let doc: LocalCatalogDocument = serde_yaml::from_str(content)?;
        Ok(Self::from_document(doc))
    }

    /// Load a catalog from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Number of entries held for `kind`
    pub fn count(&self, kind: TaxonomyKind) -> usize {
        self.rows.get(&kind).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl LocalCatalogStore for StaticCatalogStore {
    async fn query(
        &self,
        kind: TaxonomyKind,
        filter: &CatalogFilter,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        let Some(rows) = self.rows.get(&kind) else {
            return Ok(vec![]);
        };

        Ok(rows
            .iter()
            .filter(|row| filter.ids.is_empty() || filter.ids.contains(&row.entry.id))
            .filter(|row| match &filter.parent_id {
                Some(parent) => row.parent.as_deref() == Some(parent.as_str()),
                None => true,
            })
            .map(|row| row.entry.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
programs:
  - { id: program2, name: "Bada Math" }
  - { id: program5, name: "Bada Read" }
categories:
  - { id: developmental1, name: "Speech & Language Skills" }
sub_categories:
  - { id: skills1, name: "Phonics", parent: developmental1 }
  - { id: skills9, name: "Counting", parent: developmental4 }
ages:
  - { id: age1, name: "3-4" }
"#;

    #[tokio::test]
    async fn test_query_by_id() {
        let store = StaticCatalogStore::from_yaml(CATALOG).unwrap();
        let found = store
            .query(TaxonomyKind::Program, &CatalogFilter::by_id("program2"))
            .await
            .unwrap();
        assert_eq!(found, vec![CatalogEntry::new("program2", "Bada Math")]);
    }

    #[tokio::test]
    async fn test_query_sub_category_respects_parent() {
        let store = StaticCatalogStore::from_yaml(CATALOG).unwrap();

        let under_parent = store
            .query(
                TaxonomyKind::SubCategory,
                &CatalogFilter::by_id("skills1").with_parent("developmental1"),
            )
            .await
            .unwrap();
        assert_eq!(under_parent.len(), 1);

        let wrong_parent = store
            .query(
                TaxonomyKind::SubCategory,
                &CatalogFilter::by_id("skills1").with_parent("developmental4"),
            )
            .await
            .unwrap();
        assert!(wrong_parent.is_empty());
    }

    #[tokio::test]
    async fn test_empty_filter_returns_all() {
        let store = StaticCatalogStore::from_yaml(CATALOG).unwrap();
        let all = store
            .query(TaxonomyKind::Program, &CatalogFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(store.count(TaxonomyKind::Grade), 0);
    }
}
