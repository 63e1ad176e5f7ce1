use tracing_subscriber::{fmt, EnvFilter};

use crate::types::Environment;

/// Level used when `RUST_LOG` is unset or invalid
const DEFAULT_LOG_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global tracing subscriber
pub fn init(environment: &Environment) {
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(env_filter())
            .without_time()
            .init();
    } else {
        fmt().with_env_filter(env_filter()).init();
    }
}
