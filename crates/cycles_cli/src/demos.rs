use std::cell::Cell;
use std::io::Write;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::bail;
use cli::args::CacheArg;
use division::{CycleMode, Divider, DivisionError};
use memo::{
    memoize, memoize_lru, memoize_manual, memoize_with_ttl, CachePolicy, Lru, Manual, MemoError, Memoized, MonotonicClock,
    Ttl, Unbounded,
};
use reactive::{Computed, ReactiveError, Value};
use tracing::info;

type AckermannArgs = (u64, u64);

pub(crate) struct AckermannSettings {
    pub(crate) cache: CacheArg,
    pub(crate) capacity: NonZeroUsize,
    pub(crate) ttl: Duration,
}

pub(crate) fn divide(out: &mut impl Write, numerator: i64, denominator: i64, mode: CycleMode) -> anyhow::Result<()> {
    let expansion = Divider::with_cycle_mode(mode).divide(numerator, denominator)?;
    writeln!(out, "{}/{} = {}", numerator, denominator, expansion)?;
    Ok(())
}

fn ackermann_step<P>(ack: &Memoized<AckermannArgs, u64, P>, &(m, n): &AckermannArgs) -> Result<u64, MemoError>
where
    P: CachePolicy<AckermannArgs, u64>,
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

fn counted<P>(
    computations: Rc<Cell<usize>>,
) -> impl Fn(&Memoized<AckermannArgs, u64, P>, &AckermannArgs) -> Result<u64, MemoError>
where
    P: CachePolicy<AckermannArgs, u64>,
{
    move |ack, args| {
        computations.set(computations.get() + 1);
        ackermann_step(ack, args)
    }
}

pub(crate) fn ackermann(out: &mut impl Write, m: u64, n: u64, settings: AckermannSettings) -> anyhow::Result<()> {
    let computations = Rc::new(Cell::new(0_usize));
    let args = (m, n);

    let value = match settings.cache {
        CacheArg::Plain => memoize(counted::<Unbounded<_, _>>(computations.clone())).call(args),
        CacheArg::Manual => memoize_manual(counted::<Manual<_, _>>(computations.clone())).call(args),
        CacheArg::Ttl => memoize_with_ttl(
            settings.ttl,
            counted::<Ttl<_, _, MonotonicClock>>(computations.clone()),
        )
        .call(args),
        CacheArg::Lru => memoize_lru(settings.capacity, counted::<Lru<_, _>>(computations.clone())).call(args),
    }?;

    info!(
        "Computed Ackermann function. cache: {:?}, computations: {}",
        settings.cache,
        computations.get()
    );

    writeln!(out, "ack({}, {}) = {}", m, n, value)?;
    writeln!(out, "computations: {}", computations.get())?;
    Ok(())
}

pub(crate) fn reentrant(out: &mut impl Write, n: u64) -> anyhow::Result<()> {
    let stuck = memoize(|stuck, &k: &u64| -> Result<u64, MemoError> { stuck.call(k) });
    match stuck.call(n) {
        Err(MemoError::Cycle(error)) => writeln!(out, "stuck({}): {}", n, error)?,
        other => bail!("Expected a cycle. result: {:?}", other),
    }

    let factorial = memoize(|factorial, &k: &u64| -> Result<u64, MemoError> {
        match k {
            0 => Ok(1),
            k => Ok(k * factorial.call(k - 1)?),
        }
    });
    writeln!(out, "factorial({}) = {}", n, factorial.call(n)?)?;

    Ok(())
}

pub(crate) fn reactive_values(out: &mut impl Write) -> anyhow::Result<()> {
    let price = Value::new(10_i64);
    let quantity = Value::new(3_i64);

    let recomputations = Arc::new(AtomicUsize::new(0));
    let counter = recomputations.clone();
    let total = Computed::new(&[price.clone(), quantity.clone()], move |inputs: &[i64]| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(inputs[0] * inputs[1])
    });

    let mut report = |label: &str| -> anyhow::Result<()> {
        writeln!(
            out,
            "{}: total = {} (recomputations: {})",
            label,
            total.value()?,
            recomputations.load(Ordering::SeqCst)
        )?;
        Ok(())
    };

    report("first read")?;
    report("second read")?;
    quantity.set(3);
    report("quantity set to 3")?;
    price.set(12);
    report("price set to 12")?;

    let slot: Arc<OnceLock<Computed<i64>>> = Arc::new(OnceLock::new());
    let for_follower = slot.clone();
    let follower = Computed::new(&[price.clone()], move |inputs: &[i64]| match for_follower.get() {
        Some(leader) => Ok(inputs[0] + leader.value()?),
        None => Ok(inputs[0]),
    });
    let follower_for_leader = follower.clone();
    let leader = Computed::new(&[price], move |inputs: &[i64]| Ok(inputs[0] + follower_for_leader.value()?));
    if slot.set(leader.clone()).is_err() {
        bail!("Leader already set");
    }

    match leader.value() {
        Err(error @ ReactiveError::CircularDependency { .. }) => writeln!(out, "leader <-> follower: {}", error)?,
        other => bail!("Expected a circular dependency. result: {:?}", other),
    }

    Ok(())
}

pub(crate) fn all(out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "== division")?;
    for (numerator, denominator) in [(1, 3), (1, 7), (1, 6), (1, 4), (22, 7), (-5, 3)] {
        divide(out, numerator, denominator, CycleMode::Describe)?;
    }
    match Divider::new().divide(1, 0) {
        Err(error @ DivisionError::DivisionByZero { .. }) => writeln!(out, "1/0: {}", error)?,
        other => bail!("Expected division by zero. result: {:?}", other),
    }

    writeln!(out, "== memoization")?;
    ackermann(out, 3, 4, AckermannSettings {
        cache: CacheArg::Plain,
        capacity: NonZeroUsize::MIN,
        ttl: Duration::from_secs(1),
    })?;
    reentrant(out, 5)?;

    writeln!(out, "== reactive")?;
    reactive_values(out)?;

    Ok(())
}
