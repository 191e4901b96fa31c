//! # Rolling History
//!
//! A fixed-capacity map keyed by arrival timestamp. Inserting past the
//! capacity evicts the oldest entries first, so `len() <= capacity()` holds
//! after every insert.
//!
//! Events that the control loop must act on exactly once are wrapped in
//! [`Tracked`], which carries an explicit [`Disposition`] instead of a
//! parallel flag table.

use std::collections::BTreeMap;

/// Whether a tracked event has been acted upon yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not yet acted upon.
    Pending,
    /// Acted upon (alerted, reported, or deliberately ignored).
    Consumed,
}

/// A history value together with its disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    pub value: T,
    pub disposition: Disposition,
}

impl<T> Tracked<T> {
    pub fn pending(value: T) -> Self {
        Tracked {
            value,
            disposition: Disposition::Pending,
        }
    }

    pub fn consumed(value: T) -> Self {
        Tracked {
            value,
            disposition: Disposition::Consumed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.disposition == Disposition::Pending
    }

    /// Mark the value consumed. Returns `true` if it was pending, so the
    /// transition happens at most once.
    pub fn consume(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.disposition = Disposition::Consumed;
        was_pending
    }
}

/// Fixed-capacity history, oldest evicted first.
#[derive(Debug, Clone)]
pub struct RollingHistory<K, V> {
    capacity: usize,
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> RollingHistory<K, V> {
    /// Create an empty history. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        RollingHistory {
            capacity: capacity.max(1),
            entries: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry and evict the oldest surplus entries.
    ///
    /// A key equal to an existing one replaces that entry.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
        while self.entries.len() > self.capacity {
            self.entries.pop_first();
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<(&K, &V)> {
        self.entries.last_key_value()
    }

    pub fn latest_mut(&mut self) -> Option<(&K, &mut V)> {
        self.entries.iter_mut().next_back()
    }

    /// The entry immediately before the most recent one.
    pub fn previous(&self) -> Option<(&K, &V)> {
        self.entries.iter().rev().nth(1)
    }

    pub fn newest_first(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().rev()
    }

    pub fn oldest_first(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
