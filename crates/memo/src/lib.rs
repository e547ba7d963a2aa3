//! Memoization with re-entrancy guards.
//!
//! A [`Memoized`] function caches results by argument and marks each argument as
//! in-flight while it is being computed. A call that arrives with the same arguments
//! before the first one has returned is rejected with a [`CycleError`] instead of
//! recursing forever. Calls with different arguments recurse normally.
//!
//! Four cache policies are available:
//!
//! - [`memoize`]: unbounded, entries live as long as the memoizer.
//! - [`memoize_manual`]: unbounded, with [`Memoized::clear`] and [`Memoized::invalidate`].
//! - [`memoize_with_ttl`]: entries expire a fixed duration after being computed.
//! - [`memoize_lru`]: at most `capacity` entries, least-recently-used first out.
//!
//! ```rust
//! use memo::{memoize, MemoError};
//!
//! let ackermann = memoize(|ack, &(m, n): &(u64, u64)| -> Result<u64, MemoError> {
//!     Ok(match (m, n) {
//!         (0, n) => n + 1,
//!         (m, 0) => ack.call((m - 1, 1))?,
//!         (m, n) => {
//!             let inner = ack.call((m, n - 1))?;
//!             ack.call((m - 1, inner))?
//!         }
//!     })
//! });
//!
//! assert_eq!(ackermann.call((3, 4)).unwrap(), 125);
//! ```
//!
//! `Memoized` uses interior mutability without locking and is confined to a single
//! thread; the in-flight marker only means "on this call stack".

mod clock;
mod entry;
mod error;
mod key;
mod lru;
mod memoized;
mod policy;
mod ttl;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use entry::{Entry, Lookup};
pub use error::{CycleError, MemoError};
pub use key::{Canonical, KeyError};
pub use lru::Lru;
pub use memoized::{memoize, memoize_lru, memoize_manual, memoize_with_ttl, memoize_with_ttl_and_clock, Memoized};
pub use policy::{CachePolicy, Manual, Unbounded};
pub use ttl::Ttl;
