use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use crate::entry::{Entry, Lookup};

/// Storage and retention rules for the entries of a [`crate::Memoized`] function.
///
/// The memoizer drives a key through `lookup`, then `begin` (the key becomes in-flight),
/// then either `resolve` or, if the computation failed, `abandon`.
pub trait CachePolicy<K, V> {
    fn lookup(&mut self, key: &K) -> Lookup<V>;

    fn begin(&mut self, key: K);

    fn resolve(&mut self, key: K, value: V);

    /// Drops an in-flight entry whose computation failed.
    fn abandon(&mut self, key: &K);

    /// True if a resolved entry is held for `key`.
    fn contains(&self, key: &K) -> bool;

    /// Number of entries held, in-flight ones included.
    fn len(&self) -> usize;
}

fn lookup_in<K, V>(entries: &HashMap<K, Entry<V>>, key: &K) -> Lookup<V>
where
    K: Eq + Hash,
    V: Clone,
{
    match entries.get(key) {
        None => Lookup::Absent,
        Some(Entry::InFlight) => Lookup::InFlight,
        Some(Entry::Resolved(value)) | Some(Entry::ResolvedUntil(value, _)) => Lookup::Hit(value.clone()),
    }
}

fn abandon_in<K, V>(entries: &mut HashMap<K, Entry<V>>, key: &K)
where
    K: Eq + Hash,
{
    if entries.get(key).is_some_and(Entry::is_in_flight) {
        entries.remove(key);
    }
}

/// Keeps every entry for the lifetime of the memoizer.
#[derive(Debug)]
pub struct Unbounded<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> Default for Unbounded<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> CachePolicy<K, V> for Unbounded<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn lookup(&mut self, key: &K) -> Lookup<V> {
        lookup_in(&self.entries, key)
    }

    fn begin(&mut self, key: K) {
        self.entries.insert(key, Entry::InFlight);
    }

    fn resolve(&mut self, key: K, value: V) {
        self.entries.insert(key, Entry::Resolved(value));
    }

    fn abandon(&mut self, key: &K) {
        abandon_in(&mut self.entries, key);
    }

    fn contains(&self, key: &K) -> bool {
        matches!(self.entries.get(key), Some(Entry::Resolved(_)))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Keeps entries until the caller clears or invalidates them.
#[derive(Debug)]
pub struct Manual<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> Default for Manual<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> Manual<K, V>
where
    K: Eq + Hash + Debug,
{
    /// Removes every resolved entry. In-flight entries stay so re-entrant calls are still rejected.
    pub fn clear(&mut self) {
        debug!("Clearing cache. entries: {}", self.entries.len());
        self.entries.retain(|_, entry| entry.is_in_flight());
    }

    /// Removes the resolved entry for `key`. Returns false if there was none.
    ///
    /// An in-flight entry is left in place.
    pub fn invalidate(&mut self, key: &K) -> bool {
        if self.entries.get(key).is_none_or(Entry::is_in_flight) {
            return false;
        }
        self.entries.remove(key);
        debug!("Invalidated entry. key: {:?}", key);
        true
    }
}

impl<K, V> CachePolicy<K, V> for Manual<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn lookup(&mut self, key: &K) -> Lookup<V> {
        lookup_in(&self.entries, key)
    }

    fn begin(&mut self, key: K) {
        self.entries.insert(key, Entry::InFlight);
    }

    fn resolve(&mut self, key: K, value: V) {
        self.entries.insert(key, Entry::Resolved(value));
    }

    fn abandon(&mut self, key: &K) {
        abandon_in(&mut self.entries, key);
    }

    fn contains(&self, key: &K) -> bool {
        matches!(self.entries.get(key), Some(Entry::Resolved(_)))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
