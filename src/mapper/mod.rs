//! Cross-system identifier mapping cache
//!
//! `Mapper` turns local taxonomy ids into external catalog ids. Names are the
//! only thing the two catalogs share, so each resolution looks the local
//! entity up, fetches the matching external scope once, and matches by exact
//! name. Results are memoized for the lifetime of the mapper.
//!
//! # Resolution order
//!
//! ```text
//! program ──► subject / category / age / grade
//!    │
//!    └──► category ──► sub_category
//! ```
//!
//! Dependencies are resolved before the dependent kind's lock is taken, so a
//! task never holds two kind locks at once.
//!
//! # Locking
//!
//! Each kind has one `tokio::sync::Mutex` held across the external fetch.
//! Concurrent callers asking for the same unpopulated scope queue behind it
//! and exactly one of them performs the fetch. A caller whose token fires
//! while queued leaves with `Cancelled`.

mod cache;
mod joined;
mod program;
mod program_scoped;
mod sub_category;

pub use cache::ScopeState;
pub use joined::{join_unique, map_joined, split_ids};

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::catalog::{
    CatalogError, CatalogFilter, ExternalCatalogClient, LocalCatalogStore,
};
use crate::config::MapperConfig;
use crate::error::Result;
use crate::policy::{FallbackPolicy, OrganizationPolicy};
use crate::taxonomy::{CatalogEntry, Operator, TaxonomyKind};
use cache::{guarded, KindCache};

/// Mapping cache bound to one operator
pub struct Mapper {
    operator: Operator,
    client: Arc<dyn ExternalCatalogClient>,
    store: Arc<dyn LocalCatalogStore>,
    organizations: OrganizationPolicy,
    fallback: FallbackPolicy,
    /// Local age label -> external age label
    age_names: HashMap<String, String>,

    programs: Mutex<KindCache>,
    subjects: Mutex<KindCache>,
    categories: Mutex<KindCache>,
    sub_categories: Mutex<KindCache>,
    ages: Mutex<KindCache>,
    grades: Mutex<KindCache>,
}

impl Mapper {
    /// Create a mapper from loaded configuration
    pub fn new(
        operator: Operator,
        client: Arc<dyn ExternalCatalogClient>,
        store: Arc<dyn LocalCatalogStore>,
        config: &MapperConfig,
    ) -> Self {
        Self::with_policies(
            operator,
            client,
            store,
            OrganizationPolicy::from_config(&config.organizations),
            FallbackPolicy::from_config(&config.fallback),
            config.age_names.clone(),
        )
    }

    /// Create a mapper from explicit policies
    pub fn with_policies(
        operator: Operator,
        client: Arc<dyn ExternalCatalogClient>,
        store: Arc<dyn LocalCatalogStore>,
        organizations: OrganizationPolicy,
        fallback: FallbackPolicy,
        age_names: HashMap<String, String>,
    ) -> Self {
        Self {
            operator,
            client,
            store,
            organizations,
            fallback,
            age_names,
            programs: Mutex::default(),
            subjects: Mutex::default(),
            categories: Mutex::default(),
            sub_categories: Mutex::default(),
            ages: Mutex::default(),
            grades: Mutex::default(),
        }
    }

    pub fn organizations(&self) -> &OrganizationPolicy {
        &self.organizations
    }

    /// Fetch state of an external scope.
    ///
    /// Scopes are the operator's org id for programs, the external program id
    /// for subjects/categories/ages/grades, and the external category id for
    /// sub-categories. Waits for any fetch in progress on that kind.
    pub async fn scope_state(&self, kind: TaxonomyKind, scope: &str) -> ScopeState {
        self.cache(kind).lock().await.state(scope)
    }

    fn cache(&self, kind: TaxonomyKind) -> &Mutex<KindCache> {
        match kind {
            TaxonomyKind::Program => &self.programs,
            TaxonomyKind::Subject => &self.subjects,
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::SubCategory => &self.sub_categories,
            TaxonomyKind::Age => &self.ages,
            TaxonomyKind::Grade => &self.grades,
        }
    }

    /// One external round trip for `scope` of `kind`
    async fn fetch_scope(
        &self,
        kind: TaxonomyKind,
        scope: &str,
    ) -> std::result::Result<Vec<CatalogEntry>, CatalogError> {
        let op = &self.operator;
        match kind {
            TaxonomyKind::Program => self.client.programs_by_organization(op).await,
            TaxonomyKind::Subject => self.client.subjects_by_program(op, scope).await,
            TaxonomyKind::Category => self.client.categories_by_program(op, scope).await,
            TaxonomyKind::SubCategory => self.client.sub_categories_by_category(op, scope).await,
            TaxonomyKind::Age => self.client.ages_by_program(op, scope).await,
            TaxonomyKind::Grade => self.client.grades_by_program(op, scope).await,
        }
    }

    /// Look up one local entity by id
    async fn local_entity(
        &self,
        cancel: &CancellationToken,
        kind: TaxonomyKind,
        id: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<CatalogEntry>> {
        let mut filter = CatalogFilter::by_id(id);
        if let Some(parent) = parent_id {
            filter = filter.with_parent(parent);
        }

        let found = guarded(cancel, self.store.query(kind, &filter)).await?;
        Ok(found.into_iter().find(|entry| entry.id == id))
    }
}
