//! Tracing‑Setup für die Binaries.
//!
//! Diagnose geht nach stderr, damit stdout exakt die Programmausgabe bleibt.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_DIRECTIVE: &str = "warn";

/// `RUST_LOG` falls gesetzt und gültig, sonst [`DEFAULT_DIRECTIVE`]
pub fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// installiert den globalen Subscriber; ein zweiter Aufruf ist ein No‑op
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}
