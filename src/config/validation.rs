//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the endpoint is an absolute http(s) URL
//! - Validate value ranges (counts and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SimConfig → Result<(), Vec<ValidationError>>
//! - The master key is checked by key derivation, not here

use std::fmt;

use crate::config::schema::SimConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration for semantic problems.
pub fn validate_config(config: &SimConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.rpc) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.host_str().is_none() {
                errors.push(ValidationError::new("rpc", "endpoint has no host"));
            }
        }
        Ok(url) => errors.push(ValidationError::new(
            "rpc",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("rpc", format!("invalid URL: {}", e))),
    }

    if config.mine == 0 {
        errors.push(ValidationError::new("mine", "must be at least 1"));
    }
    if config.xpriv.trim().is_empty() {
        errors.push(ValidationError::new("xpriv", "must not be empty"));
    }
    if config.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("rpc_timeout_secs", "must be greater than 0"));
    }

    if config.retries.enabled && config.retries.max_attempts == 0 {
        errors.push(ValidationError::new(
            "retries.max_attempts",
            "must be at least 1 when retries are enabled",
        ));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.poll.max_attempts == 0 {
        errors.push(ValidationError::new("poll.max_attempts", "must be at least 1"));
    }
    if config.poll.base_delay_ms > config.poll.max_delay_ms {
        errors.push(ValidationError::new(
            "poll.base_delay_ms",
            "must not exceed poll.max_delay_ms",
        ));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("'{}' is not a socket address", addr),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SimConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = SimConfig::default();
        config.rpc = "ftp://127.0.0.1".to_string();
        config.mine = 0;
        config.poll.max_attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["rpc", "mine", "poll.max_attempts"]);
    }

    #[test]
    fn test_rejects_unparseable_endpoint() {
        let mut config = SimConfig::default();
        config.rpc = "127.0.0.1:18332".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "rpc");
    }

    #[test]
    fn test_rejects_bad_metrics_address() {
        let mut config = SimConfig::default();
        config.observability.metrics_address = Some("localhost".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
