//! dictionary/cache.rs
//! Per-level cache of digested artifacts.
//!
//! Design notes:
//! - The map lock is held only to find or insert a level's slot.
//! - A built artifact lives in a `OnceLock` and is read without locking.
//! - The slot's build lock only serialises materialisation, so one level
//!   builds at most once while other levels proceed independently.
//! - A failed build stores nothing; the next caller retries.
//! - Entries are never evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, TryLockError};

use crate::types::DictError;
use crate::utils::lock;

/// Lifecycle of one cache entry. `Cached` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DigestState {
    Absent,
    Materializing,
    Cached,
}

/// A single lazily-built artifact.
pub(crate) struct DigestSlot<D> {
    value: OnceLock<Arc<D>>,
    build: Mutex<()>,
}

impl<D> DigestSlot<D> {
    pub(crate) fn new() -> Self {
        Self { value: OnceLock::new(), build: Mutex::new(()) }
    }

    /// Return the stored artifact, building it with `init` if absent.
    /// The flag is true when this call built it.
    pub(crate) fn get_or_try_init<F>(&self, init: F) -> Result<(Arc<D>, bool), DictError>
    where
        F: FnOnce() -> Result<D, DictError>,
    {
        if let Some(existing) = self.value.get() {
            return Ok((Arc::clone(existing), false));
        }
        let _building = lock(&self.build);
        // Another caller may have finished while we waited.
        if let Some(existing) = self.value.get() {
            return Ok((Arc::clone(existing), false));
        }
        let built = Arc::new(init()?);
        let stored = self.value.get_or_init(|| Arc::clone(&built));
        Ok((Arc::clone(stored), true))
    }

    pub(crate) fn state(&self) -> DigestState {
        if self.value.get().is_some() {
            return DigestState::Cached;
        }
        match self.build.try_lock() {
            Err(TryLockError::WouldBlock) => DigestState::Materializing,
            Ok(_) | Err(TryLockError::Poisoned(_)) => {
                // The build may have completed between the two reads.
                if self.value.get().is_some() {
                    DigestState::Cached
                } else {
                    DigestState::Absent
                }
            }
        }
    }
}

/// Slots keyed by compression level.
pub(crate) struct DigestCache<D> {
    slots: Mutex<HashMap<i32, Arc<DigestSlot<D>>>>,
}

impl<D> DigestCache<D> {
    pub(crate) fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }

    fn slot(&self, level: i32) -> Arc<DigestSlot<D>> {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(level).or_insert_with(|| Arc::new(DigestSlot::new())))
    }

    pub(crate) fn get_or_try_init<F>(&self, level: i32, init: F) -> Result<(Arc<D>, bool), DictError>
    where
        F: FnOnce() -> Result<D, DictError>,
    {
        // Map lock released before building.
        let slot = self.slot(level);
        slot.get_or_try_init(init)
    }

    pub(crate) fn state(&self, level: i32) -> DigestState {
        let slot = lock(&self.slots).get(&level).cloned();
        slot.map_or(DigestState::Absent, |s| s.state())
    }

    /// Levels holding a built artifact, ascending.
    pub(crate) fn cached_levels(&self) -> Vec<i32> {
        let mut levels: Vec<i32> = lock(&self.slots)
            .iter()
            .filter(|(_, slot)| slot.value.get().is_some())
            .map(|(level, _)| *level)
            .collect();
        levels.sort_unstable();
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn absent_until_built() {
        let cache: DigestCache<u32> = DigestCache::new();
        assert_eq!(cache.state(3), DigestState::Absent);

        let (value, fresh) = cache.get_or_try_init(3, || Ok(42)).unwrap();
        assert!(fresh);
        assert_eq!(*value, 42);
        assert_eq!(cache.state(3), DigestState::Cached);
    }

    #[test]
    fn second_lookup_reuses_artifact() {
        let cache: DigestCache<u32> = DigestCache::new();
        let (first, _) = cache.get_or_try_init(1, || Ok(1)).unwrap();
        let (second, fresh) = cache.get_or_try_init(1, || panic!("must not rebuild")).unwrap();
        assert!(!fresh);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failure_leaves_slot_absent() {
        let cache: DigestCache<u32> = DigestCache::new();
        let err = cache
            .get_or_try_init(7, || Err(DictError::allocation("test artifact")))
            .unwrap_err();
        assert!(matches!(err, DictError::Allocation { .. }));
        assert_eq!(cache.state(7), DigestState::Absent);
        assert!(cache.cached_levels().is_empty());

        let (value, fresh) = cache.get_or_try_init(7, || Ok(9)).unwrap();
        assert!(fresh);
        assert_eq!(*value, 9);
    }

    #[test]
    fn slot_reports_materializing_while_held() {
        let slot: DigestSlot<u32> = DigestSlot::new();
        let _ = slot.get_or_try_init(|| {
            assert_eq!(slot.state(), DigestState::Materializing);
            Ok(1)
        });
        assert_eq!(slot.state(), DigestState::Cached);
    }

    #[test]
    fn cached_stays_cached_under_concurrent_hits() {
        let cache: DigestCache<u32> = DigestCache::new();
        cache.get_or_try_init(3, || Ok(3)).unwrap();
        let stop = AtomicBool::new(false);

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    while !stop.load(Ordering::Relaxed) {
                        let (_, fresh) = cache.get_or_try_init(3, || panic!("must not rebuild")).unwrap();
                        assert!(!fresh);
                    }
                });
            }
            let flips = (0..20_000)
                .filter(|_| cache.state(3) != DigestState::Cached || cache.cached_levels() != [3])
                .count();
            stop.store(true, Ordering::Relaxed);
            assert_eq!(flips, 0);
        });
    }

    #[test]
    fn cached_levels_sorted() {
        let cache: DigestCache<i32> = DigestCache::new();
        for level in [9, -1, 3] {
            cache.get_or_try_init(level, || Ok(level)).unwrap();
        }
        let _ = cache.get_or_try_init(5, || Err(DictError::allocation("x")));
        assert_eq!(cache.cached_levels(), vec![-1, 3, 9]);
    }
}
