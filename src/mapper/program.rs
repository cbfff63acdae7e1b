//! Program resolution

use tokio_util::sync::CancellationToken;

use super::cache::lock_guarded;
use super::Mapper;
use crate::error::Result;
use crate::taxonomy::TaxonomyKind;

impl Mapper {
    /// Resolve a local program id to an external program id.
    ///
    /// Never fails for an unmapped id: unknown programs and unmatched names
    /// resolve to the global default program. A headquarters-only program
    /// requested for any other organization always resolves to the default,
    /// including when a real mapping is already cached.
    pub async fn program(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
    ) -> Result<String> {
        let default = self.fallback.default_program();

        if !self.organizations.allows_program(org_id, program_id) {
            tracing::debug!(
                org_id = %org_id,
                program_id = %program_id,
                "Headquarters program requested by non-headquarters organization"
            );
            return Ok(default.to_string());
        }

        let mut cache = lock_guarded(cancel, &self.programs).await?;
        if let Some(external_id) = cache.resolved(program_id) {
            return Ok(external_id.to_string());
        }

        let Some(local) = self
            .local_entity(cancel, TaxonomyKind::Program, program_id, None)
            .await?
        else {
            tracing::warn!(program_id = %program_id, "Unknown local program, using default");
            return Ok(default.to_string());
        };

        // The program list depends only on the operator, so it is fetched
        // once per mapper regardless of the requesting organization.
        let scope = self.operator.org_id.as_str();
        cache
            .ensure_populated(
                TaxonomyKind::Program,
                scope,
                cancel,
                self.fetch_scope(TaxonomyKind::Program, scope),
            )
            .await?;

        match cache.lookup(scope, &local.name).map(str::to_string) {
            Some(external_id) => Ok(cache.remember(program_id.to_string(), external_id)),
            None => {
                tracing::warn!(
                    program_id = %program_id,
                    name = %local.name,
                    "No external program with matching name, using default"
                );
                Ok(default.to_string())
            }
        }
    }
}
