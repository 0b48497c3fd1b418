//! Logging initialisation
//!
//! `RUST_LOG` takes precedence, then the filter passed in (from `-v` or the
//! project config). Logs go to stderr so they never mix with plan output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
pub fn init_logging(filter: &str, ansi: bool) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(filter)
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(ansi),
        )
        .with(env_filter)
        .init();
}
