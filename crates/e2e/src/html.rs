//! Static HTML inspection
//!
//! CSS selection over captured markup, used for scoped lookups inside
//! elements returned by any [`Page`], and [`SnapshotPage`], a read-only
//! page backed by saved documents.

use async_trait::async_trait;
use parking_lot::Mutex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::page::{normalize_text, Element, Page};

fn parse_selector(selector: &str) -> E2eResult<Selector> {
    Selector::parse(selector).map_err(|e| E2eError::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

fn is_hidden(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value
        .attr("style")
        .map(|s| s.replace(' ', "").to_ascii_lowercase().contains("display:none"))
        .unwrap_or(false)
}

fn rendered_text(el: &ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_script = node
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| matches!(p.value().name(), "script" | "style" | "noscript" | "template"))
            .unwrap_or(false);
        if !in_script {
            parts.push(&**text);
        }
    }
    normalize_text(&parts.join(" "))
}

fn to_element(el: ElementRef<'_>) -> Element {
    let visible = !is_hidden(&el)
        && !el.ancestors().filter_map(ElementRef::wrap).any(|a| is_hidden(&a));
    Element {
        tag: el.value().name().to_string(),
        text: rendered_text(&el),
        html: el.html(),
        attributes: el
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        visible,
    }
}

/// Elements matching `selector` in a full document
pub fn select(document: &str, selector: &str) -> E2eResult<Vec<Element>> {
    let selector = parse_selector(selector)?;
    let doc = Html::parse_document(document);
    Ok(doc.select(&selector).map(to_element).collect())
}

/// Elements matching `selector` strictly inside the element `outer_html`
/// whose tag is `tag`
pub fn select_in_fragment(tag: &str, outer_html: &str, selector: &str) -> E2eResult<Vec<Element>> {
    let selector = parse_selector(selector)?;

    // Table parts and options only survive parsing inside their parents.
    let wrapped = match tag {
        "tr" => format!("<table><tbody>{outer_html}</tbody></table>"),
        "td" | "th" => format!("<table><tbody><tr>{outer_html}</tr></tbody></table>"),
        "tbody" | "thead" | "tfoot" => format!("<table>{outer_html}</table>"),
        "option" => format!("<select>{outer_html}</select>"),
        _ => outer_html.to_string(),
    };
    let doc = Html::parse_document(&format!("<html><body>{wrapped}</body></html>"));

    let root_tag = if tag.is_empty() { "body" } else { tag };
    let root = doc
        .select(&parse_selector(root_tag)?)
        .next()
        .ok_or_else(|| E2eError::NotFound(format!("<{root_tag}> root in captured markup")))?;

    Ok(root
        .select(&selector)
        .filter(|el| el.id() != root.id())
        .map(to_element)
        .collect())
}

/// Read-only page over saved HTML documents, keyed by URL or path
pub struct SnapshotPage {
    documents: BTreeMap<String, String>,
    current: Mutex<String>,
}

impl SnapshotPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let mut documents = BTreeMap::new();
        documents.insert(url.clone(), html.into());
        Self {
            documents,
            current: Mutex::new(url),
        }
    }

    /// Add another document reachable through `goto`
    pub fn with_document(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.documents.insert(url.into(), html.into());
        self
    }

    /// Snapshot of a single saved file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::new(format!("file://{}", path.display()), html))
    }

    fn current_document(&self) -> E2eResult<String> {
        let url = self.current.lock().clone();
        self.documents
            .get(&url)
            .cloned()
            .ok_or_else(|| E2eError::NotFound(format!("snapshot for {url}")))
    }

    fn read_only(action: &str) -> E2eError {
        E2eError::Unsupported(format!("{action} on a read-only snapshot"))
    }
}

#[async_trait]
impl Page for SnapshotPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        if !self.documents.contains_key(url) {
            return Err(E2eError::NotFound(format!("snapshot for {url}")));
        }
        *self.current.lock() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.current.lock().clone())
    }

    async fn query(&self, selector: &str) -> E2eResult<Vec<Element>> {
        select(&self.current_document()?, selector)
    }

    async fn click(&self, _selector: &str, _index: usize) -> E2eResult<()> {
        Err(Self::read_only("click"))
    }

    async fn fill(&self, _selector: &str, _index: usize, _value: &str) -> E2eResult<()> {
        Err(Self::read_only("fill"))
    }

    async fn select_option(&self, _selector: &str, _index: usize, _value: &str) -> E2eResult<()> {
        Err(Self::read_only("select"))
    }

    async fn wait_for_load(&self) -> E2eResult<()> {
        Ok(())
    }
}
