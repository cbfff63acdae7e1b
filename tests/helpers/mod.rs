//! Shared fixtures for mapper integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use taxonomy_mapper::config::ProgramDefaults;
use taxonomy_mapper::{
    CatalogEntry, CatalogError, ExternalCatalogClient, FallbackPolicy, Mapper, Operator,
    OrganizationPolicy, StaticCatalogStore, TaxonomyKind,
};

pub const HQ_ORG: &str = "org-hq";
pub const SCHOOL_ORG: &str = "org-school";
pub const DEFAULT_PROGRAM: &str = "7565ae11-8130-4b7d-ac24-1d9dd6f792f2";

/// Scripted external catalog that counts every call
#[derive(Default)]
pub struct CountingClient {
    programs: Vec<CatalogEntry>,
    /// (kind, scope) -> entries
    scoped: HashMap<(TaxonomyKind, String), Vec<CatalogEntry>>,
    /// (kind, scope) -> calls made
    calls: Mutex<HashMap<(TaxonomyKind, String), usize>>,
    total: AtomicUsize,
    /// Kinds whose calls fail with this error
    failures: Mutex<HashMap<TaxonomyKind, CatalogError>>,
    delay: Option<Duration>,
}

impl CountingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_programs(mut self, programs: &[(&str, &str)]) -> Self {
        self.programs = entries(programs);
        self
    }

    pub fn with_scope(mut self, kind: TaxonomyKind, scope: &str, list: &[(&str, &str)]) -> Self {
        self.scoped.insert((kind, scope.to_string()), entries(list));
        self
    }

    /// Sleep inside every call, widening race windows
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail(&self, kind: TaxonomyKind, err: CatalogError) {
        self.failures.lock().unwrap().insert(kind, err);
    }

    pub fn heal(&self, kind: TaxonomyKind) {
        self.failures.lock().unwrap().remove(&kind);
    }

    pub fn calls(&self, kind: TaxonomyKind, scope: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(kind, scope.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn calls_for_kind(&self, kind: TaxonomyKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    async fn serve(
        &self,
        kind: TaxonomyKind,
        scope: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap()
            .entry((kind, scope.to_string()))
            .or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failures.lock().unwrap().get(&kind).cloned() {
            return Err(err);
        }

        if kind == TaxonomyKind::Program {
            return Ok(self.programs.clone());
        }

        Ok(self
            .scoped
            .get(&(kind, scope.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ExternalCatalogClient for CountingClient {
    async fn programs_by_organization(
        &self,
        operator: &Operator,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.serve(TaxonomyKind::Program, &operator.org_id).await
    }

    async fn subjects_by_program(
        &self,
        _operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.serve(TaxonomyKind::Subject, program_id).await
    }

    async fn categories_by_program(
        &self,
        _operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.serve(TaxonomyKind::Category, program_id).await
    }

    async fn ages_by_program(
        &self,
        _operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.serve(TaxonomyKind::Age, program_id).await
    }

    async fn grades_by_program(
        &self,
        _operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.serve(TaxonomyKind::Grade, program_id).await
    }

    async fn sub_categories_by_category(
        &self,
        _operator: &Operator,
        category_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.serve(TaxonomyKind::SubCategory, category_id).await
    }
}

fn entries(list: &[(&str, &str)]) -> Vec<CatalogEntry> {
    list.iter()
        .map(|(id, name)| CatalogEntry::new(*id, *name))
        .collect()
}

/// Local catalog shared by the integration tests
pub fn local_catalog() -> StaticCatalogStore {
    StaticCatalogStore::from_yaml(
        r#"
programs:
  - { id: program2, name: "Bada Math" }
  - { id: program9, name: "Math" }
  - { id: program11, name: "Retired Program" }
subjects:
  - { id: subject1, name: "Language/Literacy" }
  - { id: subject2, name: "Math" }
  - { id: subject3, name: "Science" }
categories:
  - { id: developmental1, name: "Speech & Language Skills" }
  - { id: developmental2, name: "Cognitive Skills" }
sub_categories:
  - { id: skills1, name: "Counting", parent: developmental2 }
  - { id: skills2, name: "Patterns", parent: developmental2 }
  - { id: skills3, name: "Phonics", parent: developmental1 }
ages:
  - { id: age1, name: "3-4" }
  - { id: age2, name: "4-5" }
  - { id: age9, name: "Adult" }
grades:
  - { id: grade1, name: "PreK-1" }
  - { id: grade2, name: "Kindergarten" }
"#,
    )
    .expect("fixture catalog parses")
}

fn program_defaults(subject: &str, category: Option<&str>, grade: &str) -> ProgramDefaults {
    ProgramDefaults {
        subject: Some(subject.to_string()),
        category: category.map(str::to_string),
        grade: Some(grade.to_string()),
    }
}

pub fn fallback_policy() -> FallbackPolicy {
    FallbackPolicy::new(DEFAULT_PROGRAM)
        .with_program(
            "program2",
            program_defaults("math-default-subject", Some("math-default-category"), "math-default-grade"),
        )
        .with_program(
            "program9",
            // No default category: sub-category fallbacks for this program are broken.
            program_defaults("plain-math-default-subject", None, "plain-math-default-grade"),
        )
        .with_program(
            "*",
            program_defaults("none-subject", Some("none-category"), "none-grade"),
        )
}

pub fn organization_policy() -> OrganizationPolicy {
    OrganizationPolicy::new([HQ_ORG], ["program2"])
}

pub fn age_names() -> HashMap<String, String> {
    [("3-4", "3 - 4 year(s)"), ("4-5", "4 - 5 year(s)")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// External catalog matching `local_catalog`
pub fn standard_client() -> CountingClient {
    CountingClient::new()
        .with_programs(&[("math-ext-id", "Bada Math"), ("plain-math-ext-id", "Math")])
        .with_scope(
            TaxonomyKind::Subject,
            "math-ext-id",
            &[("ext-subject-math", "Math"), ("ext-subject-lit", "Language/Literacy")],
        )
        .with_scope(
            TaxonomyKind::Subject,
            DEFAULT_PROGRAM,
            &[("ext-subject-none-math", "Math")],
        )
        .with_scope(
            TaxonomyKind::Category,
            "math-ext-id",
            &[("ext-cat-cognitive", "Cognitive Skills")],
        )
        .with_scope(
            TaxonomyKind::SubCategory,
            "ext-cat-cognitive",
            &[("ext-skill-counting", "Counting")],
        )
        .with_scope(
            TaxonomyKind::SubCategory,
            "math-default-category",
            &[("ext-skill-none", "None Specified")],
        )
        .with_scope(
            TaxonomyKind::Age,
            "math-ext-id",
            &[("ext-age-1", "3 - 4 year(s)"), ("ext-age-2", "4 - 5 year(s)")],
        )
        .with_scope(
            TaxonomyKind::Grade,
            "math-ext-id",
            &[("ext-grade-prek", "PreK-1")],
        )
        .with_scope(
            TaxonomyKind::Grade,
            "plain-math-ext-id",
            &[("ext-grade-prek-plain", "PreK-1"), ("ext-grade-k", "Kindergarten")],
        )
}

pub fn operator() -> Operator {
    Operator::new(HQ_ORG, "migration-user", "test-token")
}

pub fn mapper_with(client: Arc<CountingClient>) -> Mapper {
    Mapper::with_policies(
        operator(),
        client,
        Arc::new(local_catalog()),
        organization_policy(),
        fallback_policy(),
        age_names(),
    )
}
