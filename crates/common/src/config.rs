//! Run configuration
//!
//! Loaded from a TOML file (every field optional), then overridden by CLI
//! flags and environment variables in the `shopcheck` binary.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::shipping::FreeShippingRule;
use crate::{Error, Result};

/// Top-level run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Storefront base URL
    pub base_url: String,

    /// Scenarios executed concurrently, each in its own browser session
    pub parallelism: usize,

    /// Accepted order-confirmation phrases (matched case-insensitively)
    pub confirmation_phrases: Vec<String>,

    /// Polling bounds and timeouts
    pub timing: TimingConfig,

    /// Storefront paths
    pub paths: PathsConfig,

    /// Billing details used when filling checkout
    pub checkout: CheckoutDetails,

    /// Free shipping minimum amount configured on the storefront
    pub free_shipping: FreeShippingRule,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            parallelism: 1,
            confirmation_phrases: vec![
                "order has been received".to_string(),
                "order received".to_string(),
                "thank you".to_string(),
            ],
            timing: TimingConfig::default(),
            paths: PathsConfig::default(),
            checkout: CheckoutDetails::default(),
            free_shipping: FreeShippingRule::default(),
        }
    }
}

/// Polling bounds and timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wall-clock bound for a single scenario step
    pub operation_timeout_ms: u64,

    /// Pause between polling attempts
    pub poll_interval_ms: u64,

    /// Attempts when waiting for cart rows to appear
    pub cart_poll_attempts: u32,

    /// Attempts when waiting for a container or indicator to attach
    pub attach_attempts: u32,

    /// Attempts when waiting for a recalculation indicator to clear
    pub settle_attempts: u32,

    /// Full retries of the order-total search
    pub retries: u32,

    /// Attempts when waiting for one cart removal to land
    pub removal_attempts: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: 60_000,
            poll_interval_ms: 250,
            cart_poll_attempts: 12,
            attach_attempts: 20,
            settle_attempts: 40,
            retries: 5,
            removal_attempts: 40,
        }
    }
}

impl TimingConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Storefront paths, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub listing: String,
    pub home: String,
    /// Conventional cart path first, then alternate legacy paths
    pub cart: Vec<String>,
    pub checkout: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            listing: "/shop/".to_string(),
            home: "/".to_string(),
            cart: vec!["/cart/".to_string(), "/?page_id=cart".to_string()],
            checkout: "/checkout/".to_string(),
        }
    }
}

impl PathsConfig {
    /// Conventional cart path
    pub fn primary_cart(&self) -> &str {
        self.cart.first().map(String::as_str).unwrap_or("/cart/")
    }
}

/// Billing details for the minimal checkout form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutDetails {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postcode: String,
    pub phone: String,
    pub email: String,
}

impl Default for CheckoutDetails {
    fn default() -> Self {
        Self {
            first_name: "Test".to_string(),
            last_name: "Shopper".to_string(),
            address: "1 Test Street".to_string(),
            city: "Testville".to_string(),
            postcode: "10001".to_string(),
            phone: "5550100".to_string(),
            email: "shopper@example.com".to_string(),
        }
    }
}

impl RunConfig {
    /// Load configuration from file, defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would make polling or scheduling meaningless
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.parallelism == 0 {
            return Err(Error::InvalidConfig("parallelism must be at least 1".to_string()));
        }
        if self.timing.operation_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "timing.operation_timeout_ms must be positive".to_string(),
            ));
        }
        if self.paths.cart.is_empty() {
            return Err(Error::InvalidConfig("paths.cart must list at least one path".to_string()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
