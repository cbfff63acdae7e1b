//! Per-kind resolution cache
//!
//! Each taxonomy kind owns one `KindCache` behind its own lock. It holds the
//! name index built from external fetches, the set of scopes already
//! fetched, and the memoized local-id -> external-id results.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::catalog::CatalogError;
use crate::error::{MapperError, Result};
use crate::taxonomy::{CatalogEntry, TaxonomyKind};

/// Join key parts with `:`
pub(crate) fn scoped_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Fetch state of one external scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// Never fetched, or the last fetch failed
    Unpopulated,
    /// Fetched; its entries are in the name index
    Populated,
}

/// Await `fut` unless `cancel` fires first
pub(crate) async fn guarded<T, E, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    MapperError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(MapperError::Cancelled),
        res = fut => res.map_err(MapperError::from),
    }
}

/// Take a kind's lock, giving up if `cancel` fires while waiting.
///
/// An uncontended lock is taken even with a cancelled token, so cache hits
/// keep working after cancellation.
pub(crate) async fn lock_guarded<'a>(
    cancel: &CancellationToken,
    cache: &'a Mutex<KindCache>,
) -> Result<MutexGuard<'a, KindCache>> {
    if let Ok(guard) = cache.try_lock() {
        return Ok(guard);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(MapperError::Cancelled),
        guard = cache.lock() => Ok(guard),
    }
}

#[derive(Debug, Default)]
pub(crate) struct KindCache {
    /// Scopes whose external list has been merged into `by_name`
    fetched: HashSet<String>,
    /// (scope, name) -> external id
    by_name: HashMap<(String, String), String>,
    /// Resolution key -> external id (append-only)
    resolved: HashMap<String, String>,
}

impl KindCache {
    pub fn resolved(&self, key: &str) -> Option<&str> {
        self.resolved.get(key).map(String::as_str)
    }

    /// Memoize a resolution; an existing entry always wins
    pub fn remember(&mut self, key: String, external_id: String) -> String {
        self.resolved.entry(key).or_insert(external_id).clone()
    }

    pub fn state(&self, scope: &str) -> ScopeState {
        if self.fetched.contains(scope) {
            ScopeState::Populated
        } else {
            ScopeState::Unpopulated
        }
    }

    pub fn lookup(&self, scope: &str, name: &str) -> Option<&str> {
        self.by_name
            .get(&(scope.to_string(), name.to_string()))
            .map(String::as_str)
    }

    /// Merge a fetched list into the index and mark the scope populated.
    /// Entries from other scopes are untouched; within a scope the first id
    /// seen for a name is kept.
    pub fn merge(&mut self, scope: &str, entries: Vec<CatalogEntry>) {
        for entry in entries {
            self.by_name
                .entry((scope.to_string(), entry.name))
                .or_insert(entry.id);
        }
        self.fetched.insert(scope.to_string());
    }

    /// Fetch and merge `scope` unless it is already populated.
    ///
    /// Must be called with the kind's lock held. A failed or cancelled fetch
    /// leaves the scope unpopulated.
    pub async fn ensure_populated<F>(
        &mut self,
        kind: TaxonomyKind,
        scope: &str,
        cancel: &CancellationToken,
        fetch: F,
    ) -> Result<()>
    where
        F: Future<Output = std::result::Result<Vec<CatalogEntry>, CatalogError>>,
    {
        if self.state(scope) == ScopeState::Populated {
            return Ok(());
        }

        tracing::debug!(kind = %kind, scope = %scope, "Fetching external catalog scope");

        let entries = match guarded(cancel, fetch).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(kind = %kind, scope = %scope, error = %e, "External fetch failed");
                return Err(e);
            }
        };

        tracing::debug!(kind = %kind, scope = %scope, count = entries.len(), "External catalog scope populated");
        self.merge(scope, entries);
        Ok(())
    }
}
