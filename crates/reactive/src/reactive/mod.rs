//! Core reactive system components.
//!
//! - `Value<T>`: a shared, thread-safe input cell. Setting it notifies nobody.
//! - `Computed<T>`: a derived value, recomputed on read when its inputs changed.
//! - `Source<T>`: anything a computed value can take as an input.
//!
//! Re-entering a computed value while it is recomputing, directly or through other
//! computed values, fails with [`ReactiveError::CircularDependency`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use reactive::{Computed, Source, Value};
//!
//! let count = Value::new(2_i32);
//! let doubled = Computed::new(&[count.clone()], |inputs: &[i32]| Ok(inputs[0] * 2));
//!
//! let sources: Vec<Arc<dyn Source<i32>>> = vec![Arc::new(doubled.clone()), Arc::new(count.clone())];
//! let total = Computed::from_sources(sources, |inputs: &[i32]| Ok(inputs.iter().sum::<i32>()));
//!
//! assert_eq!(total.value().unwrap(), 6);
//!
//! count.set(5);
//! assert_eq!(total.value().unwrap(), 15);
//! ```

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

mod computed;
mod tracker;
mod value;

pub use computed::Computed;
pub use value::Value;

/// Identity of a computed value, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReactiveError {
    #[error("Circular dependency detected. node: {node}")]
    CircularDependency { node: NodeId },

    #[error("Computation failed. reason: {reason}")]
    Computation { reason: String },
}

/// A readable input of a computed value.
pub trait Source<T>: Send + Sync {
    fn read(&self) -> Result<T, ReactiveError>;
}
