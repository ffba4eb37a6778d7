//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick pretty or JSON output from configuration
//! - Let `RUST_LOG` override the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Filter used when neither `RUST_LOG` nor the config gives a usable directive.
const FALLBACK_FILTER: &str = "route_facade=info,tower_http=info";

/// Build the log filter: `RUST_LOG` first, then the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive(&config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// A bare level applies to this crate and the HTTP layer only; anything else is used verbatim.
fn directive(level: &str) -> String {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => {
            format!("route_facade={level},tower_http={level}")
        }
        other => other.to_string(),
    }
}

/// Install the global subscriber. Returns an error if one is already set.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scoped_to_crate() {
        assert_eq!(directive("debug"), "route_facade=debug,tower_http=debug");
        assert_eq!(directive("hyper=warn,info"), "hyper=warn,info");
    }
}
