use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::Clock;
use crate::entry::{Entry, Lookup};
use crate::policy::CachePolicy;

/// Entries expire `ttl` after they were resolved and are then recomputed on the next call.
///
/// A `ttl` too large to add to the current time means the entry never expires. Expired
/// entries for other keys are pruned when a result is stored after the earliest expiry.
#[derive(Debug)]
pub struct Ttl<K, V, C> {
    entries: HashMap<K, Entry<V>>,
    ttl: Duration,
    clock: C,
    next_expiry: Option<Instant>,
}

impl<K, V, C> Ttl<K, V, C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
            next_expiry: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K, V, C> Ttl<K, V, C>
where
    K: Eq + Hash + Debug,
{
    fn prune_expired(&mut self, now: Instant) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !matches!(entry, Entry::ResolvedUntil(_, expiry) if *expiry <= now));
        debug!("Pruned expired entries. removed: {}", before - self.entries.len());

        self.next_expiry = self
            .entries
            .values()
            .filter_map(|entry| match entry {
                Entry::ResolvedUntil(_, expiry) => Some(*expiry),
                _ => None,
            })
            .min();
    }
}

impl<K, V, C> CachePolicy<K, V> for Ttl<K, V, C>
where
    K: Eq + Hash + Debug,
    V: Clone,
    C: Clock,
{
    fn lookup(&mut self, key: &K) -> Lookup<V> {
        match self.entries.get(key) {
            None => Lookup::Absent,
            Some(Entry::InFlight) => Lookup::InFlight,
            Some(Entry::ResolvedUntil(value, expiry)) => {
                if self.clock.now() < *expiry {
                    Lookup::Hit(value.clone())
                } else {
                    debug!("Entry expired. key: {:?}", key);
                    Lookup::Absent
                }
            }
            // never expires
            Some(Entry::Resolved(value)) => Lookup::Hit(value.clone()),
        }
    }

    fn begin(&mut self, key: K) {
        self.entries.insert(key, Entry::InFlight);
    }

    fn resolve(&mut self, key: K, value: V) {
        let now = self.clock.now();
        if self.next_expiry.is_some_and(|next_expiry| now >= next_expiry) {
            self.prune_expired(now);
        }

        match now.checked_add(self.ttl) {
            Some(expiry) => {
                self.next_expiry = Some(self.next_expiry.map_or(expiry, |next_expiry| next_expiry.min(expiry)));
                self.entries.insert(key, Entry::ResolvedUntil(value, expiry));
            }
            None => {
                self.entries.insert(key, Entry::Resolved(value));
            }
        }
    }

    fn abandon(&mut self, key: &K) {
        if self.entries.get(key).is_some_and(Entry::is_in_flight) {
            self.entries.remove(key);
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self.entries.get(key) {
            Some(Entry::ResolvedUntil(_, expiry)) => self.clock.now() < *expiry,
            Some(Entry::Resolved(_)) => true,
            _ => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
