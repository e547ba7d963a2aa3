use std::cell::RefCell;
use std::collections::HashSet;

use super::{NodeId, ReactiveError};

thread_local! {
    /// Computed values currently recomputing on this thread.
    static IN_FLIGHT: RefCell<HashSet<NodeId>> = RefCell::new(HashSet::new());
}

/// Marks a node as in flight until dropped.
pub(crate) struct InFlightGuard {
    id: NodeId,
}

pub(crate) fn enter(id: NodeId) -> Result<InFlightGuard, ReactiveError> {
    IN_FLIGHT.with_borrow_mut(|in_flight| {
        if in_flight.insert(id) {
            Ok(InFlightGuard {
                id,
            })
        } else {
            Err(ReactiveError::CircularDependency {
                node: id,
            })
        }
    })
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        IN_FLIGHT.with_borrow_mut(|in_flight| in_flight.remove(&self.id));
    }
}

#[cfg(test)]
pub(crate) fn is_in_flight(id: NodeId) -> bool {
    IN_FLIGHT.with_borrow(|in_flight| in_flight.contains(&id))
}
