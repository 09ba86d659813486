use tracing_subscriber::{fmt, EnvFilter};

/// Sets up JSON-structured logging filtered by `RUST_LOG` (defaults to `info`),
/// flattening event fields for cleaner log output.
pub fn init_normal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).json().flatten_event(true).init();
}

/// Picks between `tokio-console` and normal structured logging based on the
/// `TOKIO_CONSOLE` environment variable.
pub fn init_logging() {
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        init_console_logging();
    } else {
        init_normal_logging();
    }
}

fn init_console_logging() {
    console_subscriber::init();
}
