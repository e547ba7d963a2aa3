use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;

use indexmap::IndexMap;
use tracing::debug;

use crate::entry::{Entry, Lookup};
use crate::policy::CachePolicy;

/// Holds at most `capacity` resolved entries.
///
/// Entries are kept in access order, least-recently-used first. In-flight entries are
/// never evicted, so while computations are nested the map may briefly hold more
/// than `capacity` entries.
#[derive(Debug)]
pub struct Lru<K, V> {
    entries: IndexMap<K, Entry<V>>,
    capacity: NonZeroUsize,
}

impl<K, V> Lru<K, V>
where
    K: Eq + Hash + Debug,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    fn touch(&mut self, key: &K) {
        if let Some((key, entry)) = self.entries.shift_remove_entry(key) {
            self.entries.insert(key, entry);
        }
    }

    fn evict_excess(&mut self) {
        while self.entries.len() > self.capacity.get() {
            // the newest entry sits at the end and is never a candidate
            let candidates = self.entries.len() - 1;
            let Some(index) = self
                .entries
                .values()
                .take(candidates)
                .position(|entry| !entry.is_in_flight())
            else {
                break;
            };

            if let Some((key, _)) = self.entries.shift_remove_index(index) {
                debug!("Evicted least-recently-used entry. key: {:?}", key);
            }
        }
    }
}

impl<K, V> CachePolicy<K, V> for Lru<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    fn lookup(&mut self, key: &K) -> Lookup<V> {
        let value = match self.entries.get(key) {
            None => return Lookup::Absent,
            Some(Entry::InFlight) => return Lookup::InFlight,
            Some(Entry::Resolved(value)) | Some(Entry::ResolvedUntil(value, _)) => value.clone(),
        };
        self.touch(key);
        Lookup::Hit(value)
    }

    fn begin(&mut self, key: K) {
        self.entries.insert(key, Entry::InFlight);
    }

    fn resolve(&mut self, key: K, value: V) {
        self.entries.shift_remove(&key);
        self.entries.insert(key, Entry::Resolved(value));
        self.evict_excess();
    }

    fn abandon(&mut self, key: &K) {
        if self.entries.get(key).is_some_and(Entry::is_in_flight) {
            self.entries.shift_remove(key);
        }
    }

    fn contains(&self, key: &K) -> bool {
        matches!(self.entries.get(key), Some(Entry::Resolved(_)))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
