//! Pull-based reactive values.
//!
//! Input cells hold plain values and notify nobody. A computed value remembers the
//! input values it was last computed from and, when read, only recomputes if any of
//! them changed since.
//!
//! # Example
//!
//! ```rust
//! use reactive::{Computed, Value};
//!
//! let x = Value::new(3.0_f64);
//! let y = Value::new(4.0_f64);
//!
//! let distance = Computed::new(&[x.clone(), y.clone()], |inputs: &[f64]| {
//!     Ok((inputs[0] * inputs[0] + inputs[1] * inputs[1]).sqrt())
//! });
//!
//! assert_eq!(distance.value().unwrap(), 5.0);
//!
//! x.set(6.0);
//! y.set(8.0);
//! assert_eq!(distance.value().unwrap(), 10.0);
//! ```

pub mod reactive;

pub use reactive::{Computed, NodeId, ReactiveError, Source, Value};
