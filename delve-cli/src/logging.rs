use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter (e.g. `delve_core=debug`)
pub const LOG_ENV: &str = "DELVE_LOG";

/// Install the global subscriber.
///
/// The interactive UI owns stdout, so it logs to `<cache dir>/delve/delve.log`;
/// list mode logs warnings to stderr. Keep the returned guard alive until exit.
pub fn init_logging(to_file: bool) -> Option<WorkerGuard> {
    if to_file {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        let dir = dirs::cache_dir()?.join("delve");
        std::fs::create_dir_all(&dir).ok()?;

        let file_appender = tracing_appender::rolling::never(&dir, "delve.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_thread_names(true),
            )
            .with(filter)
            .try_init()
            .ok()?;

        Some(guard)
    } else {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_names(true)
                    .without_time(),
            )
            .with(filter)
            .try_init()
            .ok();

        None
    }
}
