//! Storefront reachability checks
//!
//! The storefront runs in its own containers; the runner only waits for it
//! to answer before opening browser sessions.

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Health check settings
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub base_url: String,
    /// Path requested on every attempt
    pub path: String,
    pub timeout: Duration,
    pub interval: Duration,
}

impl HealthCheck {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: "/".to_string(),
            timeout: Duration::from_secs(60),
            interval: Duration::from_millis(500),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Wait until the storefront answers with a non-server-error status
pub async fn wait_for_storefront(check: &HealthCheck) -> E2eResult<usize> {
    let url = check.url();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < check.timeout {
        attempts += 1;

        match client.get(&url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("Storefront answered {} at {} after {} attempts", resp.status(), url, attempts);
                return Ok(attempts);
            }
            Ok(resp) => {
                warn!("Health check returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for storefront at {}...", url);
                }
                // Connection refused is expected while containers start
                if !e.is_connect() {
                    warn!("Health check error: {}", e);
                }
            }
        }

        sleep(check.interval).await;
    }

    Err(E2eError::StorefrontHealthCheck { url, attempts })
}
