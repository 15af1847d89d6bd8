use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `filter` when set, e.g.
/// `RUST_LOG=portfolio_trajectory=debug` to see ignored fields and
/// per-request validation outcomes.
pub fn log_init(filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Default directive: this crate at `info`.
pub fn default_filter() -> String {
    format!("{}=info", env!("CARGO_CRATE_NAME"))
}
