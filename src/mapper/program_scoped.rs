//! Subject, category, age and grade resolution
//!
//! These four kinds live inside an external program: names are only unique
//! per program, and the external catalog serves them one program at a time.

use tokio_util::sync::CancellationToken;

use super::cache::{lock_guarded, scoped_key};
use super::Mapper;
use crate::error::{MapperError, Result};
use crate::taxonomy::TaxonomyKind;

impl Mapper {
    /// Resolve a local subject id within the mapped program.
    ///
    /// Falls back to the program's default subject when the subject is
    /// unknown locally or has no external name match.
    pub async fn subject(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        subject_id: &str,
    ) -> Result<String> {
        let external_program = self.program(cancel, org_id, program_id).await?;

        match self
            .match_in_program(cancel, TaxonomyKind::Subject, &external_program, subject_id)
            .await?
        {
            Some(external_id) => Ok(external_id),
            None => self.program_default(TaxonomyKind::Subject, program_id),
        }
    }

    /// Resolve a local category ("developmental") id within the mapped program.
    pub async fn category(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        category_id: &str,
    ) -> Result<String> {
        let external_program = self.program(cancel, org_id, program_id).await?;

        match self
            .match_in_program(cancel, TaxonomyKind::Category, &external_program, category_id)
            .await?
        {
            Some(external_id) => Ok(external_id),
            None => self.program_default(TaxonomyKind::Category, program_id),
        }
    }

    /// Resolve a local age id within the mapped program.
    ///
    /// Local age labels are translated before matching. There is no default
    /// age, so a miss is `NotFound`.
    pub async fn age(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        age_id: &str,
    ) -> Result<String> {
        let external_program = self.program(cancel, org_id, program_id).await?;

        self.match_in_program(cancel, TaxonomyKind::Age, &external_program, age_id)
            .await?
            .ok_or_else(|| {
                MapperError::not_found(
                    TaxonomyKind::Age,
                    scoped_key(&[&external_program, age_id]),
                )
            })
    }

    /// Resolve a local grade id within the mapped program.
    pub async fn grade(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        grade_id: &str,
    ) -> Result<String> {
        let external_program = self.program(cancel, org_id, program_id).await?;

        match self
            .match_in_program(cancel, TaxonomyKind::Grade, &external_program, grade_id)
            .await?
        {
            Some(external_id) => Ok(external_id),
            None => self.program_default(TaxonomyKind::Grade, program_id),
        }
    }

    /// Name-match `local_id` inside `external_program`.
    ///
    /// Returns `None` when the local entity is unknown or no external entry
    /// carries its name; the caller decides between a default and `NotFound`.
    async fn match_in_program(
        &self,
        cancel: &CancellationToken,
        kind: TaxonomyKind,
        external_program: &str,
        local_id: &str,
    ) -> Result<Option<String>> {
        let key = scoped_key(&[external_program, local_id]);

        let mut cache = lock_guarded(cancel, self.cache(kind)).await?;
        if let Some(external_id) = cache.resolved(&key) {
            return Ok(Some(external_id.to_string()));
        }

        let Some(local) = self.local_entity(cancel, kind, local_id, None).await? else {
            tracing::warn!(kind = %kind, local_id = %local_id, "Unknown local entity");
            return Ok(None);
        };

        let name = self.external_name(kind, &local.name);

        cache
            .ensure_populated(
                kind,
                external_program,
                cancel,
                self.fetch_scope(kind, external_program),
            )
            .await?;

        match cache.lookup(external_program, name).map(str::to_string) {
            Some(external_id) => Ok(Some(cache.remember(key, external_id))),
            None => {
                tracing::warn!(
                    kind = %kind,
                    local_id = %local_id,
                    name = %name,
                    program = %external_program,
                    "No external entry with matching name"
                );
                Ok(None)
            }
        }
    }

    /// External label for a local name; only ages use a different convention
    fn external_name<'a>(&'a self, kind: TaxonomyKind, local_name: &'a str) -> &'a str {
        if kind != TaxonomyKind::Age {
            return local_name;
        }

        match self.age_names.get(local_name) {
            Some(translated) => translated.as_str(),
            None => {
                tracing::debug!(name = %local_name, "No age label translation, matching as-is");
                local_name
            }
        }
    }

    /// Per-program default for subject, category or grade
    fn program_default(&self, kind: TaxonomyKind, program_id: &str) -> Result<String> {
        let default = match kind {
            TaxonomyKind::Subject => self.fallback.subject(program_id),
            TaxonomyKind::Category => self.fallback.category(program_id),
            TaxonomyKind::Grade => self.fallback.grade(program_id),
            _ => None,
        };

        match default {
            Some(external_id) => {
                tracing::debug!(kind = %kind, program_id = %program_id, default = %external_id, "Using fallback default");
                Ok(external_id.to_string())
            }
            None => {
                tracing::error!(kind = %kind, program_id = %program_id, "No fallback default configured");
                Err(MapperError::not_found(kind, program_id))
            }
        }
    }
}
