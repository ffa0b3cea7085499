pub mod config;
pub mod input; // Workbook reader
pub mod models;
pub mod report; // Classification, PDF reports, batch summary

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
