//! Console logging for the `checkercal` binary.
//!
//! Without the `tracing` feature, log records go through `env_logger`. With
//! it, they are bridged into the span-timing subscriber from
//! `checkercal_core`. In both cases `RUST_LOG` refines the level passed in.

use log::LevelFilter;

/// `EnvFilter`/`env_logger` directive enabling everything at `level` and above.
pub fn level_directive(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Install the console logger once. Later calls leave the first one in place.
#[cfg(not(feature = "tracing"))]
pub fn init(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp_millis()
        .format_target(false)
        .parse_default_env();
    if let Err(err) = builder.try_init() {
        log::debug!("console logger already installed: {err}");
    }
}

/// Install the console logger once. Later calls leave the first one in place.
#[cfg(feature = "tracing")]
pub fn init(level: LevelFilter) {
    let _ = tracing_log::LogTracer::init();
    checkercal_core::init_tracing(false, &level_directive(level));
}
