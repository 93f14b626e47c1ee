//! Configuration resolution: file, then environment and flags

use anyhow::{Context, Result};
use std::path::Path;

use shopcheck_common::RunConfig;
use shopcheck_e2e::{Browser, PlaywrightConfig};

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub parallelism: Option<usize>,
    pub poll_interval_ms: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timing.operation_timeout_ms = timeout_ms;
        }
        if let Some(retries) = self.retries {
            config.timing.retries = retries;
        }
        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.timing.poll_interval_ms = poll_interval_ms;
        }
    }
}

/// Load the config file (defaults when absent) and apply overrides
pub fn resolve(path: &Path, overrides: &Overrides) -> Result<RunConfig> {
    let mut config = RunConfig::load(path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Browser settings for the resolved run configuration
pub fn playwright_config(config: &RunConfig, browser: Browser, headed: bool) -> PlaywrightConfig {
    PlaywrightConfig {
        base_url: config.base_url.clone(),
        browser,
        headless: !headed,
        action_timeout_ms: config.timing.operation_timeout_ms,
        ..Default::default()
    }
}
