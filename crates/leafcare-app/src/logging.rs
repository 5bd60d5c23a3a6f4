//! `tracing` subscriber setup for the terminal front-end.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LOG_FILTER_ENV;

const DEFAULT_FILTER: &str = "info";

/// Installs a stderr fmt subscriber filtered by `LEAFCARE_LOG`.
///
/// Invalid directives fall back to `info`. Calling this twice is harmless; the
/// second install is ignored.
pub fn init_logging() {
    let directives = std::env::var(LOG_FILTER_ENV).ok();
    let _ = tracing_subscriber::registry()
        .with(env_filter(directives.as_deref()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
