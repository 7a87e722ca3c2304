use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for a binary.
///
/// `default_level` and `default_format` come from configuration; the
/// `RUST_LOG` and `RUST_LOG_FORMAT` environment variables take precedence
/// so operators can adjust verbosity without touching the config file.
pub fn init_tracing(default_level: &str, default_format: &str) {
    let level = default_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_else(|_| default_format.to_string());

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
