//! Logging setup

use log::LevelFilter;

/// Initializes `env_logger` writing to stdout.
///
/// `RUST_LOG` takes precedence; without it everything at `info` and above is
/// printed. Calling this more than once is harmless, the later calls are
/// ignored.
pub fn init() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG");

    if log_builder.try_init().is_ok() {
        log::info!("Logger initialized");
    }
}
