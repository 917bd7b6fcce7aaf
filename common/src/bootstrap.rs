// Bootstrap utilities for binary initialization

/// Initialize tracing for human-readable logging
///
/// Sets up console logging with an environment filter; `RUST_LOG` wins over
/// the built-in default.
pub fn init_human_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bot=info,common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Initialize tracing for JSON logging
///
/// Structured JSON output for production deployments.
pub fn init_json_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .json()
        .init();
}
