use log::{info, log_enabled, Level, LevelFilter};

/// Installs `env_logger` with `level` as the default when `RUST_LOG` is unset.
///
/// Returns an error instead of panicking if a logger is already installed, so
/// tests and embedders may call it more than once.
pub fn init_logger_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp_millis()
        .try_init()
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}
