use std::io::Write;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};

use crate::demos::AckermannSettings;
use crate::opts::{Command, Opts};

mod demos;
mod opts;

fn main() -> anyhow::Result<()> {
    let args = argfile::expand_args(argfile::parse_fromfile, argfile::PREFIX)?;

    let opts = Opts::parse_from(args);

    cli::tracing::configure_tracing(opts.trace.clone(), opts.verbose.clone())?;

    debug!("command: {:?}", opts.command);

    let mut out = std::io::stdout().lock();

    match opts.command {
        Command::Divide {
            numerator,
            denominator,
            on_cycle,
        } => demos::divide(&mut out, numerator, denominator, on_cycle.to_cycle_mode())?,
        Command::Ackermann {
            m,
            n,
            cache,
            capacity,
            ttl_ms,
        } => demos::ackermann(&mut out, m, n, AckermannSettings {
            cache,
            capacity,
            ttl: Duration::from_millis(ttl_ms),
        })?,
        Command::Reentrant {
            n,
        } => demos::reentrant(&mut out, n)?,
        Command::Reactive => demos::reactive_values(&mut out)?,
        Command::Demo => demos::all(&mut out)?,
    }

    out.flush()?;
    info!("Finished.");

    Ok(())
}
