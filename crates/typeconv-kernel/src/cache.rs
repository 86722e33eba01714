//! Per-session memo of resolved validators, keyed by signature string.
//!
//! Keys are the signature text with surrounding whitespace trimmed, not the
//! parsed structure: `List<A>` and `List< A >` are separate entries.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::validator::Validator;

/// Concurrent populate-or-fetch cache of validators.
///
/// The first writer for a key wins; concurrent builders of the same key all
/// converge on the stored instance.
#[derive(Debug, Default)]
pub struct ValidatorCache {
    entries: DashMap<String, Arc<Validator>>,
    /// Bumped by `clear`; a build that straddles a clear is not stored.
    epoch: AtomicU64,
    builds: AtomicUsize,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a signature.
    pub fn key(signature: &str) -> &str {
        signature.trim()
    }

    pub fn get(&self, signature: &str) -> Option<Arc<Validator>> {
        self.entries
            .get(Self::key(signature))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Current clear generation. Read it before taking anything a clear
    /// invalidates, then pass it to [`get_or_try_insert_at`](Self::get_or_try_insert_at).
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Return the cached validator for `signature`, building it on a miss.
    ///
    /// `build` runs without holding any cache lock. Errors are returned and
    /// nothing is cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        signature: &str,
        build: impl FnOnce() -> Result<Validator, E>,
    ) -> Result<Arc<Validator>, E> {
        self.get_or_try_insert_at(self.epoch(), signature, build)
    }

    /// Like [`get_or_try_insert_with`](Self::get_or_try_insert_with), but the
    /// built validator is only stored if no clear happened since `epoch`.
    pub fn get_or_try_insert_at<E>(
        &self,
        epoch: u64,
        signature: &str,
        build: impl FnOnce() -> Result<Validator, E>,
    ) -> Result<Arc<Validator>, E> {
        if let Some(found) = self.get(signature) {
            return Ok(found);
        }

        let built = Arc::new(build()?);
        self.builds.fetch_add(1, Ordering::Relaxed);

        let entry = self.entries.entry(Self::key(signature).to_string());
        if self.epoch.load(Ordering::Acquire) != epoch {
            return Ok(built);
        }
        Ok(Arc::clone(entry.or_insert(built).value()))
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validators built over the cache's lifetime, including ones that lost a race.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Cached keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn scalar() -> Result<Validator, Infallible> {
        Ok(Validator::scalar("int", None))
    }

    #[test]
    fn second_lookup_hits() {
        let cache = ValidatorCache::new();
        let first = cache.get_or_try_insert_with("int", scalar).unwrap();
        let second = cache.get_or_try_insert_with("int", scalar).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_is_trimmed_text_not_structure() {
        let cache = ValidatorCache::new();
        let a = cache.get_or_try_insert_with("  List<A>  ", scalar).unwrap();
        let b = cache.get_or_try_insert_with("List<A>", scalar).unwrap();
        let c = cache.get_or_try_insert_with("List< A >", scalar).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.keys(), vec!["List< A >".to_string(), "List<A>".to_string()]);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ValidatorCache::new();
        let failed: Result<_, &str> = cache.get_or_try_insert_with("bad", || Err("boom"));
        assert!(failed.is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.builds(), 0);
    }

    #[test]
    fn clear_empties_and_rebuilds() {
        let cache = ValidatorCache::new();
        let before = cache.get_or_try_insert_with("int", scalar).unwrap();
        cache.clear();
        assert!(cache.is_empty());

        let after = cache.get_or_try_insert_with("int", scalar).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(cache.builds(), 2);
    }

    #[test]
    fn build_straddling_clear_is_not_stored() {
        let cache = ValidatorCache::new();
        let built = cache
            .get_or_try_insert_with("int", || {
                cache.clear();
                scalar()
            })
            .unwrap();

        assert!(cache.is_empty());
        assert!(matches!(*built, Validator::Scalar(_)));
    }

    #[test]
    fn stale_epoch_is_not_stored() {
        let cache = ValidatorCache::new();
        let epoch = cache.epoch();
        cache.clear();

        let built = cache.get_or_try_insert_at(epoch, "int", scalar).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.builds(), 1);

        let stored = cache.get_or_try_insert_at(cache.epoch(), "int", scalar).unwrap();
        assert!(!Arc::ptr_eq(&built, &stored));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_callers_converge() {
        let cache = ValidatorCache::new();
        let results: Vec<Arc<Validator>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.get_or_try_insert_with("int", scalar).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let stored = cache.get("int").unwrap();
        assert!(results.iter().all(|v| Arc::ptr_eq(v, &stored)));
        assert_eq!(cache.len(), 1);
    }
}
