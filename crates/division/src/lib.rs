//! Exact long division with repeating-decimal notation.
//!
//! A division whose remainder sequence recurs is rendered with the repeating
//! digits in parentheses, e.g. `1/6` becomes `0.1(6)`.
//!
//! ```rust
//! use division::{divide, CycleMode, Divider};
//!
//! assert_eq!(divide(22, 7).unwrap(), "3.(142857)");
//!
//! let expansion = Divider::new().divide(-5, 3).unwrap();
//! assert_eq!(expansion.repeating(), &[6]);
//!
//! let strict = Divider::with_cycle_mode(CycleMode::Fail);
//! assert!(strict.divide(1, 3).is_err());
//! assert_eq!(strict.divide(1, 4).unwrap().to_string(), "0.25");
//! ```

pub mod cycle;
pub mod divider;
pub mod expansion;

pub use cycle::{Cycle, CycleDetected, CycleDetector, CycleMode};
pub use divider::{divide, Divider, DivisionError};
pub use expansion::{Expansion, ParseExpansionError};
