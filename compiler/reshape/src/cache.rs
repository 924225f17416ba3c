//! Signature-keyed artifact cache.
//!
//! Entries are never evicted or replaced. Concurrent first requests for
//! one signature may each run their build; whichever result reaches the
//! map first is kept and handed to every caller. A failed build leaves no
//! entry behind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::signature::Signature;

/// Counter snapshot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Successful builds, including ones that lost an insertion race.
    pub builds: u64,
    pub entries: usize,
}

pub struct ArtifactCache<A> {
    artifacts: DashMap<Signature, Arc<A>, FxBuildHasher>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
}

impl<A> ArtifactCache<A> {
    pub fn new() -> Self {
        ArtifactCache {
            artifacts: DashMap::with_hasher(FxBuildHasher),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
        }
    }

    pub fn get(&self, signature: &Signature) -> Option<Arc<A>> {
        self.artifacts
            .get(signature)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// The artifact for `signature`, running `build` on a miss.
    ///
    /// `build` runs without any cache lock held.
    pub fn get_or_build<E>(
        &self,
        signature: Signature,
        build: impl FnOnce() -> Result<A, E>,
    ) -> Result<Arc<A>, E> {
        if let Some(found) = self.get(&signature) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%signature, "artifact cache hit");
            return Ok(found);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%signature, "artifact cache miss");

        let built = Arc::new(build()?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        let stored = self.artifacts.entry(signature).or_insert(built);
        Ok(Arc::clone(stored.value()))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<A> Default for ArtifactCache<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for ArtifactCache<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
