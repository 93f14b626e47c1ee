//! Storefront browser client

use anyhow::{Context, Result};
use tracing::warn;

use shopcheck_common::RunConfig;
use shopcheck_e2e::playwright::check_playwright_installed;
use shopcheck_e2e::{FlowSequencer, Page, PlaywrightConfig, PlaywrightPage, PlaywrightSessions};

/// Opens browser sessions against the configured storefront
pub struct StorefrontClient {
    config: RunConfig,
    playwright: PlaywrightConfig,
}

impl StorefrontClient {
    pub fn new(config: RunConfig, playwright: PlaywrightConfig) -> Self {
        Self { config, playwright }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn flows(&self) -> FlowSequencer {
        FlowSequencer::from_config(&self.config)
    }

    /// Session factory for the scenario runner
    pub fn sessions(&self) -> PlaywrightSessions {
        PlaywrightSessions::new(self.playwright.clone())
    }

    /// Launch one browser page
    pub async fn open_page(&self) -> Result<PlaywrightPage> {
        check_playwright_installed()
            .await
            .context("install it with `npm i -D playwright && npx playwright install`")?;
        PlaywrightPage::launch(&self.playwright).await.with_context(|| {
            format!("launching {} for {}", self.playwright.browser.as_str(), self.config.base_url)
        })
    }

    /// Close a page, logging rather than failing
    pub async fn close(&self, page: PlaywrightPage) {
        if let Err(e) = page.close().await {
            warn!("closing browser failed: {}", e);
        }
    }
}
