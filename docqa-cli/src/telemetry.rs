//! Logging setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CRATES: [&str; 5] = ["docqa_core", "docqa_rag", "docqa_model", "docqa_agent", "docqa_cli"];

/// The default filter for a `-v` count: docqa crates at info, debug or trace,
/// everything else at warn.
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Logs go to stderr so answers on stdout stay
/// pipeable. `RUST_LOG` overrides the verbosity flag.
pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
