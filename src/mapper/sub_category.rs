//! Sub-category ("skill") resolution
//!
//! Sub-categories live under an external category rather than a program,
//! so both the program and the category are resolved first and the external
//! list is fetched per category.

use tokio_util::sync::CancellationToken;

use super::cache::{lock_guarded, scoped_key, KindCache};
use super::Mapper;
use crate::error::{MapperError, Result};
use crate::policy::DEFAULT_SUB_CATEGORY_NAME;
use crate::taxonomy::TaxonomyKind;

impl Mapper {
    /// Resolve a local sub-category id under a local category.
    ///
    /// A failure resolving the program or category is returned before any
    /// sub-category fetch. On a miss the default chain is walked: the
    /// program's default category, then the "None Specified" sub-category in
    /// it. A missing link is `NotFound`.
    pub async fn sub_category(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        category_id: &str,
        sub_category_id: &str,
    ) -> Result<String> {
        let external_program = self.program(cancel, org_id, program_id).await?;
        let external_category = self
            .category(cancel, org_id, program_id, category_id)
            .await?;

        // Several local categories can share one external category, so the
        // local parent is part of the key.
        let key = scoped_key(&[
            &external_program,
            category_id,
            &external_category,
            sub_category_id,
        ]);

        let mut cache = lock_guarded(cancel, &self.sub_categories).await?;
        if let Some(external_id) = cache.resolved(&key) {
            return Ok(external_id.to_string());
        }

        match self
            .local_entity(
                cancel,
                TaxonomyKind::SubCategory,
                sub_category_id,
                Some(category_id),
            )
            .await?
        {
            Some(local) => {
                cache
                    .ensure_populated(
                        TaxonomyKind::SubCategory,
                        &external_category,
                        cancel,
                        self.fetch_scope(TaxonomyKind::SubCategory, &external_category),
                    )
                    .await?;

                if let Some(external_id) = cache
                    .lookup(&external_category, &local.name)
                    .map(str::to_string)
                {
                    return Ok(cache.remember(key, external_id));
                }

                tracing::warn!(
                    sub_category_id = %sub_category_id,
                    name = %local.name,
                    category = %external_category,
                    "No external sub-category with matching name, using default"
                );
            }
            None => {
                tracing::warn!(
                    sub_category_id = %sub_category_id,
                    category_id = %category_id,
                    "Unknown local sub-category, using default"
                );
            }
        }

        self.default_sub_category(&mut cache, cancel, program_id)
            .await
    }

    async fn default_sub_category(
        &self,
        cache: &mut KindCache,
        cancel: &CancellationToken,
        program_id: &str,
    ) -> Result<String> {
        let Some(defaults) = self.fallback.defaults_for(program_id) else {
            tracing::error!(program_id = %program_id, "No fallback entry for program");
            return Err(MapperError::not_found(TaxonomyKind::Program, program_id));
        };

        let Some(default_category) = defaults.category.as_deref() else {
            tracing::error!(program_id = %program_id, "No default category configured");
            return Err(MapperError::not_found(TaxonomyKind::Category, program_id));
        };

        cache
            .ensure_populated(
                TaxonomyKind::SubCategory,
                default_category,
                cancel,
                self.fetch_scope(TaxonomyKind::SubCategory, default_category),
            )
            .await?;

        cache
            .lookup(default_category, DEFAULT_SUB_CATEGORY_NAME)
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::error!(
                    category = %default_category,
                    "Default category has no '{}' sub-category",
                    DEFAULT_SUB_CATEGORY_NAME
                );
                MapperError::not_found(
                    TaxonomyKind::SubCategory,
                    scoped_key(&[default_category, DEFAULT_SUB_CATEGORY_NAME]),
                )
            })
    }
}
