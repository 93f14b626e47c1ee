//! The page seam between flows and whatever renders the storefront
//!
//! Readers and sequencers only see [`Page`]. A live Playwright session and a
//! static HTML snapshot both implement it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::E2eResult;
use crate::html;

/// A matched element, captured at query time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,

    /// Rendered text, whitespace-collapsed
    pub text: String,

    /// Outer HTML, used for scoped lookups inside the element
    pub html: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn is_disabled(&self) -> bool {
        self.attributes.contains_key("disabled")
            || self.attr("aria-disabled") == Some("true")
            || self.has_class("disabled")
    }

    /// Elements matching `selector` inside this element
    pub fn find(&self, selector: &str) -> E2eResult<Vec<Element>> {
        html::select_in_fragment(&self.tag, &self.html, selector)
    }

    pub fn find_first(&self, selector: &str) -> E2eResult<Option<Element>> {
        Ok(self.find(selector)?.into_iter().next())
    }

    /// Text of the first match that has any text
    pub fn text_of(&self, selector: &str) -> E2eResult<Option<String>> {
        Ok(self
            .find(selector)?
            .into_iter()
            .map(|e| e.text)
            .find(|t| !t.is_empty()))
    }
}

/// Collapse runs of whitespace into single spaces and trim
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A rendered storefront page that can be inspected and acted on
///
/// Selectors are CSS. `index` picks the n-th match in document order.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to a path relative to the storefront base URL (or an absolute URL)
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    /// All elements currently matching `selector`
    async fn query(&self, selector: &str) -> E2eResult<Vec<Element>>;

    async fn click(&self, selector: &str, index: usize) -> E2eResult<()>;

    async fn fill(&self, selector: &str, index: usize, value: &str) -> E2eResult<()>;

    async fn select_option(&self, selector: &str, index: usize, value: &str) -> E2eResult<()>;

    /// Wait for any navigation started by the last action to finish loading
    async fn wait_for_load(&self) -> E2eResult<()>;

    /// Release the page; later calls may fail
    async fn close(&self) -> E2eResult<()> {
        Ok(())
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        Ok(self.query(selector).await?.len())
    }

    /// Whether any match of `selector` is visible
    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        Ok(self.query(selector).await?.iter().any(|e| e.visible))
    }

    /// Text of the whole document body
    async fn body_text(&self) -> E2eResult<String> {
        Ok(self
            .query("body")
            .await?
            .into_iter()
            .next()
            .map(|e| e.text)
            .unwrap_or_default())
    }
}
