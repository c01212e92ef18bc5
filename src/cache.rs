//! Time-boxed, exact-match cache for digests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Slot<V> {
    value: V,
    stored_at: Instant,
}

/// String-keyed cache whose entries expire after a fixed time-to-live.
pub struct TtlCache<V> {
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a live entry for `key`
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn insert(&self, key: &str, value: V) {
        self.insert_at(key, value, Instant::now())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|slot| self.is_fresh(slot, now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let slots = self.lock();
        slots
            .get(key)
            .filter(|slot| self.is_fresh(slot, now))
            .map(|slot| slot.value.clone())
    }

    fn insert_at(&self, key: &str, value: V, now: Instant) {
        let mut slots = self.lock();
        slots.retain(|_, slot| self.is_fresh(slot, now));
        slots.insert(
            key.to_string(),
            Slot {
                value,
                stored_at: now,
            },
        );
    }

    fn is_fresh(&self, slot: &Slot<V>, now: Instant) -> bool {
        now.saturating_duration_since(slot.stored_at) < self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot<V>>> {
        // entries are plain values, so a poisoned lock is still readable
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}
