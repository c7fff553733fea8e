//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::{util::TryInitError, EnvFilter};

pub const LOG_ENV: &str = "DISPATCH_LOG";

/// `DISPATCH_LOG`, then `RUST_LOG`, then `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a compact fmt subscriber. Fails if one is already installed.
pub fn try_init() -> Result<(), TryInitError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .try_init()
}

/// Like `try_init`, but a second call is a no-op.
pub fn init() {
    let _ = try_init();
}
