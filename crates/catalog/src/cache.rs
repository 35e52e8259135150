//! Memoizing search cache.
//!
//! Each key owns a write-once slot. The map lock is held only to find or
//! create a slot, never while a supplier runs, so different keys never wait
//! on each other. Callers racing on the same key block on the slot until the
//! single supplier finishes.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;

use crate::{Product, SearchCriteria};

type Slot = Arc<OnceCell<Vec<Product>>>;

/// Search results keyed by criteria.
///
/// # Guarantees
/// - For a given key, the supplier runs at most once between invalidations.
/// - A supplier error is returned to its caller and nothing is stored; the
///   next caller for that key runs its own supplier.
/// - `invalidate_all` drops every entry. Callers already holding a slot
///   finish against it, but no later lookup sees it.
///
/// A supplier must not query this cache for the key it is computing.
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: RwLock<HashMap<SearchCriteria, Slot>>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `criteria`, computing it with `supplier` on a miss.
    pub fn get_or_compute<F, E>(&self, criteria: &SearchCriteria, supplier: F) -> Result<Vec<Product>, E>
    where
        F: FnOnce() -> Result<Vec<Product>, E>,
    {
        let slot = self.slot(criteria);
        slot.get_or_try_init(supplier).cloned()
    }

    /// Drop every entry. Returns how many populated entries were discarded.
    pub fn invalidate_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.write());
        drained.values().filter(|slot| slot.get().is_some()).count()
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, criteria: &SearchCriteria) -> Slot {
        {
            let entries = self.read();
            if let Some(slot) = entries.get(criteria) {
                return Arc::clone(slot);
            }
        }
        let mut entries = self.write();
        Arc::clone(entries.entry(criteria.clone()).or_default())
    }

    // Map updates are single inserts/removals of `Arc`s, so a poisoned map is
    // still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SearchCriteria, Slot>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SearchCriteria, Slot>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use marketplace_core::Price;

    fn books() -> SearchCriteria {
        SearchCriteria::any().with_category("Books")
    }

    fn one(name: &str) -> Vec<Product> {
        vec![Product::new(name, "Books", "Acme", Price::from_minor(100), 1)]
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = SearchCache::new();
        let calls = AtomicUsize::new(0);
        let supplier = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(one("Book"))
        };

        let first = cache.get_or_compute(&books(), supplier).unwrap();
        let second = cache.get_or_compute(&books(), supplier).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn equal_criteria_share_an_entry() {
        let cache = SearchCache::new();
        cache
            .get_or_compute(&books(), || Ok::<_, Infallible>(one("Book")))
            .unwrap();
        let hit = cache
            .get_or_compute(&SearchCriteria::any().with_category(" Books "), || {
                Ok::<_, Infallible>(one("other"))
            })
            .unwrap();
        assert_eq!(hit[0].name, "Book");
    }

    #[test]
    fn failed_supplier_leaves_nothing_behind() {
        let cache = SearchCache::new();
        let err = cache
            .get_or_compute(&books(), || Err::<Vec<Product>, _>("boom"))
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty());

        let ok = cache
            .get_or_compute(&books(), || Ok::<_, &str>(one("Book")))
            .unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn invalidate_all_reports_cleared_entries() {
        let cache = SearchCache::new();
        assert_eq!(cache.invalidate_all(), 0);

        cache
            .get_or_compute(&books(), || Ok::<_, Infallible>(one("Book")))
            .unwrap();
        cache
            .get_or_compute(&SearchCriteria::any(), || Ok::<_, Infallible>(Vec::new()))
            .unwrap();
        assert_eq!(cache.invalidate_all(), 2);
        assert!(cache.is_empty());

        let calls = AtomicUsize::new(0);
        cache
            .get_or_compute(&books(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(one("Fresh"))
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn racing_callers_run_one_supplier() {
        const THREADS: usize = 8;
        let cache = Arc::new(SearchCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_compute(&books(), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok::<_, Infallible>(one("Book"))
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), one("Book"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn result_computed_before_invalidation_is_not_served_after_it() {
        let cache = Arc::new(SearchCache::new());
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let stale = {
            let cache = Arc::clone(&cache);
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            thread::spawn(move || {
                cache
                    .get_or_compute(&books(), || {
                        started.wait();
                        release.wait();
                        Ok::<_, Infallible>(one("Stale"))
                    })
                    .unwrap()
            })
        };

        started.wait();
        assert_eq!(cache.invalidate_all(), 0);
        let fresh = cache
            .get_or_compute(&books(), || Ok::<_, Infallible>(one("Fresh")))
            .unwrap();
        assert_eq!(fresh[0].name, "Fresh");

        release.wait();
        // The in-flight caller still gets its own result.
        assert_eq!(stale.join().unwrap()[0].name, "Stale");

        let again = cache
            .get_or_compute(&books(), || Ok::<_, Infallible>(one("Recomputed")))
            .unwrap();
        assert_eq!(again[0].name, "Fresh");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn slow_key_does_not_block_other_keys() {
        let cache = Arc::new(SearchCache::new());
        let started = Arc::new(Barrier::new(2));

        let slow = {
            let cache = Arc::clone(&cache);
            let started = Arc::clone(&started);
            thread::spawn(move || {
                cache
                    .get_or_compute(&books(), || {
                        started.wait();
                        thread::sleep(Duration::from_millis(300));
                        Ok::<_, Infallible>(one("Slow"))
                    })
                    .unwrap()
            })
        };

        started.wait();
        let begun = std::time::Instant::now();
        cache
            .get_or_compute(&SearchCriteria::any(), || Ok::<_, Infallible>(Vec::new()))
            .unwrap();
        assert!(begun.elapsed() < Duration::from_millis(250));

        assert_eq!(slow.join().unwrap()[0].name, "Slow");
    }
}
