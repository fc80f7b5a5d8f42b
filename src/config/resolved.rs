//! Resolved, immutable simulation configuration.

use std::time::Duration;

use crate::config::schema::{PollConfig, RetryConfig, SimConfig};
use crate::keys::{zero_path, KeyDeriver, KeyDerivationError};

/// A [`SimConfig`] paired with the zero-index address derived from its key.
///
/// The zero address is only ever computed from the master key; swapping the
/// key goes through [`Configuration::with_xpriv`], which derives it again.
#[derive(Debug, Clone)]
pub struct Configuration {
    config: SimConfig,
    zero_address: String,
}

impl Configuration {
    /// Resolve a configuration, deriving the zero address with `keys`.
    pub fn new(config: SimConfig, keys: &dyn KeyDeriver) -> Result<Self, KeyDerivationError> {
        let zero_address = keys.derive_address(&config.xpriv, &zero_path())?;
        tracing::debug!(zero_address = %zero_address, "Zero address derived");
        Ok(Self {
            config,
            zero_address,
        })
    }

    /// Same settings with a different master key.
    pub fn with_xpriv(
        &self,
        xpriv: impl Into<String>,
        keys: &dyn KeyDeriver,
    ) -> Result<Self, KeyDerivationError> {
        let mut config = self.config.clone();
        config.xpriv = xpriv.into();
        Self::new(config, keys)
    }

    pub fn raw(&self) -> &SimConfig {
        &self.config
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc
    }

    pub fn xpriv(&self) -> &str {
        &self.config.xpriv
    }

    pub fn zero_address(&self) -> &str {
        &self.zero_address
    }

    /// Default block count for `mine`.
    pub fn mine_count(&self) -> u64 {
        self.config.mine
    }

    /// Default delay for `wait_for_next_header`.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.config.delay)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.config.rpc_timeout_secs)
    }

    pub fn retries(&self) -> &RetryConfig {
        &self.config.retries
    }

    pub fn poll(&self) -> &PollConfig {
        &self.config.poll
    }
}
