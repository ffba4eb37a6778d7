//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Require at least one enabled provider
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FacadeConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{FacadeConfig, ProviderConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    BadAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid http(s) URL")]
    BadUrl { field: String, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("no routing provider is enabled")]
    NoProviders,
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &FacadeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs".into(),
        });
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.max_body_bytes".into(),
        });
    }

    let providers = [
        ("yours", &config.providers.yours),
        ("ecan", &config.providers.ecan),
    ];
    for (name, provider) in providers.iter().filter(|(_, p)| p.enabled) {
        validate_provider(name, provider, &mut errors);
    }
    if providers.iter().all(|(_, p)| !p.enabled) {
        errors.push(ValidationError::NoProviders);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_provider(name: &str, provider: &ProviderConfig, errors: &mut Vec<ValidationError>) {
    let valid_url = Url::parse(&provider.base_url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid_url {
        errors.push(ValidationError::BadUrl {
            field: format!("providers.{}.base_url", name),
            value: provider.base_url.clone(),
        });
    }

    if provider.timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: format!("providers.{}.timeout_secs", name),
        });
    }
}
