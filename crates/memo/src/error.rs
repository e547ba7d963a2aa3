use std::fmt::Debug;

use thiserror::Error;

/// A call arrived with arguments whose computation was still in flight.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cycle detected. key: {key}")]
pub struct CycleError {
    pub key: String,
}

impl CycleError {
    pub fn for_key<K: Debug>(key: &K) -> Self {
        Self {
            key: format!("{:?}", key),
        }
    }
}

/// Default error type for memoized computations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("Computation failed. reason: {reason}")]
    Failed { reason: String },
}
