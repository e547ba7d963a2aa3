use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_log::AsTrace;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// Installs the global tracing subscriber.
///
/// Events at or above the verbosity level go to stderr and, when `trace` is given,
/// also to that file without ANSI colors.
pub fn configure_tracing(trace: Option<PathBuf>, verbosity: Verbosity<InfoLevel>) -> anyhow::Result<()> {
    let level = verbosity.log_level_filter().as_trace();

    let trace_layer = match trace {
        Some(path) => {
            let file = File::create(&path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(level),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(level),
        )
        .with(trace_layer)
        .try_init()?;

    Ok(())
}
