//! High score that only goes up.

use crate::observable::Observable;
use crate::store::{KeyValueStore, SCORE_KEY};
use log::{debug, error, warn};
use std::sync::Arc;

/// Monotonic score accumulator with write-through persistence.
///
/// `set_score` accepts a value only if it is 0 (an explicit reset) or larger
/// than the current score. Anything else is ignored.
pub struct ScoreTracker {
    score: Observable<i32>,
    store: Arc<dyn KeyValueStore>,
}

impl ScoreTracker {
    /// Load the persisted score (0 if none).
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut initial = store.get(SCORE_KEY);
        if initial < 0 {
            warn!("[Score] ignoring negative stored score {}", initial);
            initial = 0;
        }
        Self {
            score: Observable::new(initial),
            store,
        }
    }

    pub fn score(&self) -> i32 {
        self.score.get()
    }

    /// Observable score for views.
    pub fn observable(&self) -> &Observable<i32> {
        &self.score
    }

    /// Offer a new score. Returns `true` if it was accepted.
    ///
    /// The check and the write to the store happen under the score's lock;
    /// listeners are notified after it is released, so they may call back
    /// into the tracker.
    pub fn set_score(&self, value: i32) -> bool {
        let mut accepted = false;
        self.score.update(|&current| {
            if value != 0 && value <= current {
                debug!("[Score] ignoring {} (current {})", value, current);
                return None;
            }
            accepted = true;
            if let Err(e) = self.store.set(SCORE_KEY, value) {
                error!("[Score] failed to save score {}: {}", value, e);
            }
            Some(value)
        });
        accepted
    }

    pub fn reset(&self) {
        self.set_score(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, Result};
    use crate::store::{JsonFileStore, MemoryStore};
    use parking_lot::Mutex;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> i32 {
            0
        }

        fn set(&self, _key: &str, _value: i32) -> Result<()> {
            Err(CoreError::IoError(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_score_only_increases_except_reset() {
        let store = Arc::new(MemoryStore::new());
        let tracker = ScoreTracker::load(store.clone());

        let mut observed = Vec::new();
        for value in [5, 3, 10, 0, 7] {
            tracker.set_score(value);
            observed.push((tracker.score(), store.get(SCORE_KEY)));
        }
        assert_eq!(observed, vec![(5, 5), (5, 5), (10, 10), (0, 0), (7, 7)]);
    }

    #[test]
    fn test_equal_and_negative_values_rejected() {
        let tracker = ScoreTracker::load(Arc::new(MemoryStore::new()));
        assert!(tracker.set_score(4));
        assert!(!tracker.set_score(4));
        assert!(!tracker.set_score(-2));
        assert_eq!(tracker.score(), 4);
    }

    #[test]
    fn test_loads_persisted_score() {
        let store = Arc::new(MemoryStore::new());
        store.set(SCORE_KEY, 73).unwrap();

        let tracker = ScoreTracker::load(store);
        assert_eq!(tracker.score(), 73);
        assert!(!tracker.set_score(70));
        assert_eq!(tracker.score(), 73);
    }

    #[test]
    fn test_negative_persisted_score_treated_as_zero() {
        let store = Arc::new(MemoryStore::new());
        store.set(SCORE_KEY, -9).unwrap();
        assert_eq!(ScoreTracker::load(store).score(), 0);
    }

    #[test]
    fn test_reset_persists_zero() {
        let store = Arc::new(MemoryStore::new());
        let tracker = ScoreTracker::load(store.clone());
        tracker.set_score(99);
        tracker.reset();
        assert_eq!(tracker.score(), 0);
        assert_eq!(store.get(SCORE_KEY), 0);
    }

    #[test]
    fn test_save_failure_keeps_value() {
        let tracker = ScoreTracker::load(Arc::new(FailingStore));
        assert!(tracker.set_score(8));
        assert_eq!(tracker.score(), 8);
    }

    #[test]
    fn test_listener_may_reset_score() {
        let tracker = Arc::new(ScoreTracker::load(Arc::new(MemoryStore::new())));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::downgrade(&tracker);
        let log = seen.clone();
        tracker.observable().subscribe(move |value| {
            log.lock().push(*value);
            if *value > 100
                && let Some(tracker) = inner.upgrade()
            {
                tracker.reset();
            }
        });

        assert!(tracker.set_score(150));
        assert_eq!(tracker.score(), 0);
        assert_eq!(*seen.lock(), vec![150, 0]);
    }

    #[test]
    fn test_score_survives_reload_from_file() {
        let dir = std::env::temp_dir()
            .join(format!("heartbeat-board-score-{}", std::process::id()));
        let path = dir.join("preferences.json");
        let _ = std::fs::remove_dir_all(&dir);

        let tracker = ScoreTracker::load(Arc::new(JsonFileStore::open(&path)));
        assert!(tracker.set_score(42));
        drop(tracker);

        let reloaded = ScoreTracker::load(Arc::new(JsonFileStore::open(&path)));
        assert_eq!(reloaded.score(), 42);
        assert!(!reloaded.set_score(41));
        assert_eq!(reloaded.score(), 42);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
