use std::time::Instant;

/// State of a cached argument. A key with no entry has not been computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<V> {
    /// Computation started and has not yet returned.
    InFlight,
    Resolved(V),
    /// Resolved, valid until the given instant.
    ResolvedUntil(V, Instant),
}

impl<V> Entry<V> {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Entry::InFlight)
    }
}

/// Result of probing a cache policy for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Absent,
    InFlight,
    Hit(V),
}
