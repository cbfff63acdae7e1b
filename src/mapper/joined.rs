//! Comma-joined id fields
//!
//! Migration records store multi-valued taxonomy fields as comma-joined
//! local ids. Each id is resolved on its own; several local ids often land on
//! the same external id (typically a default), so results are deduplicated
//! in resolution order before being joined again.

use std::collections::HashSet;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::Mapper;
use crate::error::Result;

/// Split a comma-joined id list, skipping blanks
pub fn split_ids(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(',').map(str::trim).filter(|id| !id.is_empty())
}

/// Join ids with commas, dropping repeats but keeping first-seen order
pub fn join_unique<I>(ids: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let unique: Vec<String> = ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();
    unique.join(",")
}

/// Resolve every id of a comma-joined field with `resolve`.
///
/// Ids are resolved one after another; the first error aborts the field.
pub async fn map_joined<F, Fut>(joined: &str, mut resolve: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut resolved = Vec::new();
    for id in split_ids(joined) {
        resolved.push(resolve(id.to_string()).await?);
    }
    Ok(join_unique(resolved))
}

impl Mapper {
    pub async fn subjects_joined(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        subject_ids: &str,
    ) -> Result<String> {
        map_joined(subject_ids, move |id| async move {
            self.subject(cancel, org_id, program_id, &id).await
        })
        .await
    }

    pub async fn categories_joined(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        category_ids: &str,
    ) -> Result<String> {
        map_joined(category_ids, move |id| async move {
            self.category(cancel, org_id, program_id, &id).await
        })
        .await
    }

    pub async fn sub_categories_joined(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        category_id: &str,
        sub_category_ids: &str,
    ) -> Result<String> {
        map_joined(sub_category_ids, move |id| async move {
            self.sub_category(cancel, org_id, program_id, category_id, &id)
                .await
        })
        .await
    }

    pub async fn ages_joined(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        age_ids: &str,
    ) -> Result<String> {
        map_joined(age_ids, move |id| async move {
            self.age(cancel, org_id, program_id, &id).await
        })
        .await
    }

    pub async fn grades_joined(
        &self,
        cancel: &CancellationToken,
        org_id: &str,
        program_id: &str,
        grade_ids: &str,
    ) -> Result<String> {
        map_joined(grade_ids, move |id| async move {
            self.grade(cancel, org_id, program_id, &id).await
        })
        .await
    }
}
