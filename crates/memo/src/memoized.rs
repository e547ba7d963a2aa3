use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::entry::Lookup;
use crate::error::{CycleError, MemoError};
use crate::lru::Lru;
use crate::policy::{CachePolicy, Manual, Unbounded};
use crate::ttl::Ttl;

type Computation<K, V, P, E> = Box<dyn Fn(&Memoized<K, V, P, E>, &K) -> Result<V, E>>;

/// A function whose results are cached by argument.
///
/// The wrapped computation receives the memoizer itself, so recursive calls go
/// through the cache and through the re-entrancy guard.
pub struct Memoized<K, V, P, E = MemoError> {
    cache: RefCell<P>,
    compute: Computation<K, V, P, E>,
}

impl<K, V, P, E> Memoized<K, V, P, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    P: CachePolicy<K, V>,
    E: From<CycleError>,
{
    pub fn with_policy<F>(policy: P, compute: F) -> Self
    where
        F: Fn(&Memoized<K, V, P, E>, &K) -> Result<V, E> + 'static,
    {
        Self {
            cache: RefCell::new(policy),
            compute: Box::new(compute),
        }
    }

    /// Returns the cached result for `args`, computing it if needed.
    ///
    /// Fails with a [`CycleError`] if a computation for the same `args` is already in
    /// progress further up the call stack. If the computation fails, nothing is cached
    /// and the error is returned as is.
    pub fn call(&self, args: K) -> Result<V, E> {
        let lookup = self.cache.borrow_mut().lookup(&args);
        match lookup {
            Lookup::Hit(value) => {
                trace!("Cache hit. key: {:?}", args);
                return Ok(value);
            }
            Lookup::InFlight => {
                debug!("Re-entrant call rejected. key: {:?}", args);
                return Err(CycleError::for_key(&args).into());
            }
            Lookup::Absent => {
                debug!("Cache miss. key: {:?}", args);
            }
        }

        self.cache.borrow_mut().begin(args.clone());

        match (self.compute)(self, &args) {
            Ok(value) => {
                self.cache.borrow_mut().resolve(args, value.clone());
                Ok(value)
            }
            Err(error) => {
                self.cache.borrow_mut().abandon(&args);
                Err(error)
            }
        }
    }

    /// True if a usable result is cached for `args`.
    pub fn is_cached(&self, args: &K) -> bool {
        self.cache.borrow().contains(args)
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, E> Memoized<K, V, Manual<K, V>, E>
where
    K: Eq + Hash + Debug,
{
    /// Drops every cached entry.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Drops the cached entry for `args`, if any.
    pub fn invalidate(&self, args: &K) {
        self.cache.borrow_mut().invalidate(args);
    }
}

impl<K, V, P, E> Debug for Memoized<K, V, P, E>
where
    P: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoized")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Memoizes `compute` without bound.
pub fn memoize<K, V, E, F>(compute: F) -> Memoized<K, V, Unbounded<K, V>, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    E: From<CycleError>,
    F: Fn(&Memoized<K, V, Unbounded<K, V>, E>, &K) -> Result<V, E> + 'static,
{
    Memoized::with_policy(Unbounded::default(), compute)
}

/// Memoizes `compute` until entries are explicitly cleared or invalidated.
pub fn memoize_manual<K, V, E, F>(compute: F) -> Memoized<K, V, Manual<K, V>, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    E: From<CycleError>,
    F: Fn(&Memoized<K, V, Manual<K, V>, E>, &K) -> Result<V, E> + 'static,
{
    Memoized::with_policy(Manual::default(), compute)
}

/// Memoizes `compute`, recomputing results older than `ttl`.
pub fn memoize_with_ttl<K, V, E, F>(ttl: Duration, compute: F) -> Memoized<K, V, Ttl<K, V, MonotonicClock>, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    E: From<CycleError>,
    F: Fn(&Memoized<K, V, Ttl<K, V, MonotonicClock>, E>, &K) -> Result<V, E> + 'static,
{
    memoize_with_ttl_and_clock(ttl, MonotonicClock, compute)
}

pub fn memoize_with_ttl_and_clock<K, V, C, E, F>(
    ttl: Duration,
    clock: C,
    compute: F,
) -> Memoized<K, V, Ttl<K, V, C>, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    C: Clock,
    E: From<CycleError>,
    F: Fn(&Memoized<K, V, Ttl<K, V, C>, E>, &K) -> Result<V, E> + 'static,
{
    Memoized::with_policy(Ttl::new(ttl, clock), compute)
}

/// Memoizes `compute`, keeping at most `capacity` results.
pub fn memoize_lru<K, V, E, F>(capacity: NonZeroUsize, compute: F) -> Memoized<K, V, Lru<K, V>, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    E: From<CycleError>,
    F: Fn(&Memoized<K, V, Lru<K, V>, E>, &K) -> Result<V, E> + 'static,
{
    Memoized::with_policy(Lru::new(capacity), compute)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use rstest::rstest;

    use super::*;
    use crate::clock::ManualClock;
    use crate::key::Canonical;

    fn counter() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        (count.clone(), count)
    }

    fn ackermann<P>(ack: &Memoized<(u64, u64), u64, P>, &(m, n): &(u64, u64)) -> Result<u64, MemoError>
    where
        P: CachePolicy<(u64, u64), u64>,
    {
        Ok(match (m, n) {
            (0, n) => n + 1,
            (m, 0) => ack.call((m - 1, 1))?,
            (m, n) => {
                let inner = ack.call((m, n - 1))?;
                ack.call((m - 1, inner))?
            }
        })
    }

    #[test]
    fn computes_once_per_argument() {
        // given
        let (calls, counted) = counter();
        let square = memoize(move |_, &n: &i64| -> Result<i64, MemoError> {
            counted.set(counted.get() + 1);
            Ok(n * n)
        });

        // when
        let first = square.call(12);
        let second = square.call(12);

        // then
        assert_eq!(first, Ok(144));
        assert_eq!(second, Ok(144));
        assert_eq!(calls.get(), 1);
        assert!(square.is_cached(&12));
    }

    #[rstest]
    #[case(0, 0, 1)]
    #[case(1, 2, 4)]
    #[case(2, 3, 9)]
    #[case(3, 3, 61)]
    #[case(3, 4, 125)]
    fn recursion_with_different_arguments_succeeds(#[case] m: u64, #[case] n: u64, #[case] expected: u64) {
        // given
        let ack = memoize(ackermann);

        // expect
        assert_eq!(ack.call((m, n)), Ok(expected));
    }

    #[test]
    fn ackermann_through_every_policy() {
        let clock = ManualClock::new();
        let capacity = NonZeroUsize::new(8).unwrap();

        assert_eq!(memoize(ackermann).call((3, 4)), Ok(125));
        assert_eq!(memoize_manual(ackermann).call((3, 4)), Ok(125));
        assert_eq!(memoize_lru(capacity, ackermann).call((3, 4)), Ok(125));
        assert_eq!(
            memoize_with_ttl_and_clock(Duration::from_secs(1), clock, ackermann).call((3, 4)),
            Ok(125)
        );
    }

    #[test]
    fn reentrant_call_with_same_arguments_is_a_cycle() {
        // given
        let stuck = memoize(|stuck, &n: &u32| -> Result<u32, MemoError> { stuck.call(n) });

        // when
        let result = stuck.call(7);

        // then
        assert_eq!(
            result,
            Err(MemoError::Cycle(CycleError {
                key: "7".to_string()
            }))
        );
    }

    #[test]
    fn indirect_reentrant_call_is_a_cycle() {
        // given
        // 3 -> 2 -> 1 -> 3
        let ring = memoize(|ring, &n: &u32| -> Result<u32, MemoError> {
            let next = if n == 1 { 3 } else { n - 1 };
            ring.call(next)
        });

        // when
        let result = ring.call(3);

        // then
        assert_eq!(
            result,
            Err(MemoError::Cycle(CycleError {
                key: "3".to_string()
            }))
        );
        assert!(ring.is_empty());
    }

    #[test]
    fn failed_computation_is_not_cached() {
        // given
        let (calls, counted) = counter();
        let flaky = memoize(move |_, &n: &u32| -> Result<u32, MemoError> {
            counted.set(counted.get() + 1);
            match counted.get() {
                1 => Err(MemoError::Failed {
                    reason: "first attempt".to_string(),
                }),
                _ => Ok(n),
            }
        });

        // when
        let first = flaky.call(1);
        let second = flaky.call(1);

        // then
        assert!(matches!(first, Err(MemoError::Failed { .. })));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn lru_holds_at_most_capacity_entries() {
        // given
        let (calls, counted) = counter();
        let capacity = NonZeroUsize::new(3).unwrap();
        let double = memoize_lru(capacity, move |_, &n: &u32| -> Result<u32, MemoError> {
            counted.set(counted.get() + 1);
            Ok(n * 2)
        });

        // when
        for n in 1..=5 {
            double.call(n).unwrap();
        }

        // then
        assert_eq!(double.len(), 3);
        assert!(!double.is_cached(&1));
        assert!(!double.is_cached(&2));
        assert!((3..=5).all(|n| double.is_cached(&n)));
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn lru_read_refreshes_recency() {
        // given
        let capacity = NonZeroUsize::new(2).unwrap();
        let double = memoize_lru(capacity, |_, &n: &u32| -> Result<u32, MemoError> { Ok(n * 2) });
        double.call(1).unwrap();
        double.call(2).unwrap();

        // when
        double.call(1).unwrap();
        double.call(3).unwrap();

        // then
        assert!(double.is_cached(&1));
        assert!(!double.is_cached(&2));
        assert!(double.is_cached(&3));
    }

    #[test]
    fn ttl_entry_is_recomputed_once_after_expiry() {
        // given
        let (calls, counted) = counter();
        let clock = ManualClock::new();
        let stamp = memoize_with_ttl_and_clock(
            Duration::from_millis(100),
            clock.clone(),
            move |_, &n: &u32| -> Result<usize, MemoError> {
                counted.set(counted.get() + 1);
                Ok(n as usize + counted.get())
            },
        );

        // when
        let first = stamp.call(10);
        clock.advance(Duration::from_millis(99));
        let before_expiry = stamp.call(10);

        // then
        assert_eq!(first, Ok(11));
        assert_eq!(before_expiry, Ok(11));
        assert_eq!(calls.get(), 1);

        // when
        clock.advance(Duration::from_millis(1));
        let after_expiry = stamp.call(10);
        let again = stamp.call(10);

        // then
        assert_eq!(after_expiry, Ok(12));
        assert_eq!(again, Ok(12));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn manual_invalidate_and_clear_force_recomputation() {
        // given
        let (calls, counted) = counter();
        let negate = memoize_manual(move |_, &n: &i32| -> Result<i32, MemoError> {
            counted.set(counted.get() + 1);
            Ok(-n)
        });
        negate.call(1).unwrap();
        negate.call(2).unwrap();

        // when
        negate.invalidate(&1);
        negate.invalidate(&99);
        negate.call(1).unwrap();
        negate.call(2).unwrap();

        // then
        assert_eq!(calls.get(), 3);

        // when
        negate.clear();

        // then
        assert!(negate.is_empty());
        assert_eq!(negate.call(2), Ok(-2));
        assert_eq!(calls.get(), 4);
    }

    #[rstest]
    #[case::invalidate(false)]
    #[case::clear(true)]
    fn dropping_own_entry_does_not_bypass_the_cycle_guard(#[case] clear: bool) {
        // given
        let forgetful = memoize_manual(move |forgetful, &n: &u32| -> Result<u32, MemoError> {
            match clear {
                true => forgetful.clear(),
                false => forgetful.invalidate(&n),
            }
            forgetful.call(n)
        });

        // when
        let result = forgetful.call(4);

        // then
        assert_eq!(
            result,
            Err(MemoError::Cycle(CycleError {
                key: "4".to_string()
            }))
        );
        assert!(forgetful.is_empty());
    }

    #[test]
    fn ttl_too_large_for_the_clock_never_expires() {
        // given
        let (calls, counted) = counter();
        let identity = memoize_with_ttl(Duration::MAX, move |_, &n: &u32| -> Result<u32, MemoError> {
            counted.set(counted.get() + 1);
            Ok(n)
        });

        // when
        let first = identity.call(1);
        let second = identity.call(1);

        // then
        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.get(), 1);
        assert!(identity.is_cached(&1));
    }

    #[test]
    fn non_finite_float_arguments_are_not_confused() {
        // given
        let render = memoize(|_, x: &Canonical<f64>| -> Result<String, MemoError> { Ok(format!("{}", **x)) });
        let call = |x: f64| render.call(Canonical::new(x).unwrap());

        // when
        let results = (call(f64::INFINITY), call(f64::NAN), call(f64::NEG_INFINITY));

        // then
        assert_eq!(
            results,
            (Ok("inf".to_string()), Ok("NaN".to_string()), Ok("-inf".to_string()))
        );
        assert_eq!(render.len(), 3);
    }

    #[test]
    fn canonical_arguments_share_cache_entries() {
        // given
        let (calls, counted) = counter();
        let norm = memoize(move |_, point: &Canonical<Vec<f64>>| -> Result<f64, MemoError> {
            counted.set(counted.get() + 1);
            Ok(point.iter().map(|x| x * x).sum::<f64>().sqrt())
        });

        // when
        let first = norm.call(Canonical::new(vec![3.0, 4.0]).unwrap());
        let second = norm.call(Canonical::new(vec![3.0, 4.0]).unwrap());

        // then
        assert_eq!(first, Ok(5.0));
        assert_eq!(second, Ok(5.0));
        assert_eq!(calls.get(), 1);
    }
}
