#![deny(missing_docs)]

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use cli::args::{CacheArg, CycleModeArg};

#[derive(Parser, Debug)]
#[command(name = "cycles_cli")]
#[command(bin_name = "cycles_cli")]
#[command(version, about, long_about = None)]
pub(crate) struct Opts {
    #[command(subcommand)]
    pub(crate) command: Command,

    /// Trace log file
    #[arg(long, num_args = 0..=1, default_missing_value = "trace.log")]
    pub(crate) trace: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Divide two integers, showing any repeating digits in parentheses
    #[command(allow_negative_numbers = true)]
    Divide {
        /// Numerator, e.g. '22'
        numerator: i64,

        /// Denominator, e.g. '7'
        denominator: i64,

        /// Response to a repeating expansion
        #[arg(long, value_name = "MODE", default_value = "describe")]
        on_cycle: CycleModeArg,
    },

    /// Compute the Ackermann function through a memoizing cache
    Ackermann {
        /// First argument
        #[arg(value_parser = clap::value_parser!(u64).range(0..=3))]
        m: u64,

        /// Second argument
        #[arg(value_parser = clap::value_parser!(u64).range(0..=8))]
        n: u64,

        /// Cache policy
        #[arg(long, value_name = "CACHE", default_value = "plain")]
        cache: CacheArg,

        /// Maximum number of cached results, for the 'lru' cache
        #[arg(long, value_name = "ENTRIES", default_value = "64")]
        capacity: NonZeroUsize,

        /// Lifetime of cached results in milliseconds, for the 'ttl' cache
        #[arg(long, value_name = "MILLISECONDS", default_value = "1000")]
        ttl_ms: u64,
    },

    /// Show that a re-entrant call with unchanged arguments is rejected
    Reentrant {
        /// Argument to call with
        #[arg(value_parser = clap::value_parser!(u64).range(0..=20))]
        n: u64,
    },

    /// Show recomputation of derived values when their inputs change
    Reactive,

    /// Run every demonstration
    Demo,
}
