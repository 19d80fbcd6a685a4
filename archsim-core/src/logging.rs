//! Structured logging for simulation debugging
//!
//! Thin initialization helpers over `tracing-subscriber`. The engine logs at
//! the usual altitudes: INFO for run boundaries, DEBUG for per-component
//! simulation decisions, WARN for degradation (overload, saturated pools,
//! replication lag).
//!
//! Log level can be controlled through `RUST_LOG` as usual, e.g.
//! `RUST_LOG=archsim_engine=debug` to watch composition decisions.

use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with sensible defaults (INFO and above).
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level.
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("archsim_core={level},archsim_components={level},archsim_engine={level}").into()
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Simulation logging initialized at level: {}", level);
}
