//! Playwright browser sessions
//!
//! A [`PlaywrightPage`] owns one node process running a small bridge script.
//! The bridge keeps a single browser context open and answers one JSON
//! request per line on stdin with one JSON response per line on stdout.

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use async_trait::async_trait;

use crate::error::{E2eError, E2eResult};
use crate::page::{normalize_text, Element, Page};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser {other:?}"))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Bound for a single browser action inside the bridge
    pub action_timeout_ms: u64,
    /// Node executable
    pub node: String,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: 15_000,
            node: "node".to_string(),
        }
    }
}

/// Check if Playwright is installed
pub async fn check_playwright_installed() -> E2eResult<()> {
    let status = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// One request to the bridge
#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    #[serde(flatten)]
    op: BridgeOp<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeOp<'a> {
    Goto { url: &'a str },
    Url,
    Query { selector: &'a str },
    Click { selector: &'a str, index: usize },
    Fill { selector: &'a str, index: usize, value: &'a str },
    Select { selector: &'a str, index: usize, value: &'a str },
    WaitForLoad,
    Close,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: u64,
    ok: bool,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

struct Bridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// A live browser page behind the node bridge
pub struct PlaywrightPage {
    base_url: Url,
    bridge: Mutex<Option<Bridge>>,
    next_id: AtomicU64,
    _script_dir: TempDir,
}

impl PlaywrightPage {
    /// Start a browser session
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed().await?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| E2eError::Config(format!("invalid base URL {:?}: {}", config.base_url, e)))?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, build_script(config))?;

        debug!("Starting Playwright bridge: {}", script_path.display());
        let mut child = Command::new(&config.node)
            .arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".to_string()))?;
        let mut stdout = BufReader::new(stdout);

        // Greeting once the browser context is up
        let mut line = String::new();
        stdout.read_line(&mut line).await?;
        trace!("bridge greeting: {}", line.trim());
        let greeting: serde_json::Value = serde_json::from_str(&line)
            .map_err(|e| E2eError::Playwright(format!("invalid bridge greeting {:?}: {}", line.trim(), e)))?;
        if greeting.get("ready").and_then(|v| v.as_bool()) != Some(true) {
            return Err(E2eError::Playwright(format!(
                "browser failed to start: {}",
                greeting.get("error").and_then(|v| v.as_str()).unwrap_or("unknown error")
            )));
        }

        debug!("{} session ready", config.browser.as_str());
        Ok(Self {
            base_url,
            bridge: Mutex::new(Some(Bridge { child, stdin, stdout })),
            next_id: AtomicU64::new(1),
            _script_dir: script_dir,
        })
    }

    async fn call(&self, op: BridgeOp<'_>) -> E2eResult<serde_json::Value> {
        let mut guard = self.bridge.lock().await;
        let bridge = guard
            .as_mut()
            .ok_or_else(|| E2eError::Playwright("session closed".to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::to_string(&BridgeRequest { id, op })?;
        trace!("bridge request: {}", request);
        bridge.stdin.write_all(request.as_bytes()).await?;
        bridge.stdin.write_all(b"\n").await?;
        bridge.stdin.flush().await?;

        loop {
            let mut line = String::new();
            if bridge.stdout.read_line(&mut line).await? == 0 {
                return Err(E2eError::Playwright("bridge exited".to_string()));
            }
            trace!("bridge response: {}", line.trim());

            // Anything the page logged to stdout is not ours
            let Ok(response) = serde_json::from_str::<BridgeResponse>(&line) else {
                continue;
            };
            if response.id != id {
                continue;
            }
            if response.ok {
                return Ok(response.result);
            }
            return Err(E2eError::Playwright(
                response.error.unwrap_or_else(|| "unknown bridge error".to_string()),
            ));
        }
    }

    /// Resolve a storefront path against the base URL
    pub fn resolve(&self, url: &str) -> E2eResult<String> {
        self.base_url
            .join(url)
            .map(String::from)
            .map_err(|e| E2eError::Config(format!("invalid URL {url:?}: {e}")))
    }
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let target = self.resolve(url)?;
        debug!("goto {}", target);
        self.call(BridgeOp::Goto { url: &target }).await?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let value = self.call(BridgeOp::Url).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn query(&self, selector: &str) -> E2eResult<Vec<Element>> {
        let value = self.call(BridgeOp::Query { selector }).await.map_err(|e| match e {
            E2eError::Playwright(reason) if reason.contains("selector") => E2eError::Selector {
                selector: selector.to_string(),
                reason,
            },
            other => other,
        })?;
        let mut elements: Vec<Element> = serde_json::from_value(value)?;
        for el in &mut elements {
            el.text = normalize_text(&el.text);
        }
        Ok(elements)
    }

    async fn click(&self, selector: &str, index: usize) -> E2eResult<()> {
        self.call(BridgeOp::Click { selector, index }).await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, index: usize, value: &str) -> E2eResult<()> {
        self.call(BridgeOp::Fill { selector, index, value }).await?;
        Ok(())
    }

    async fn select_option(&self, selector: &str, index: usize, value: &str) -> E2eResult<()> {
        self.call(BridgeOp::Select { selector, index, value }).await?;
        Ok(())
    }

    async fn wait_for_load(&self) -> E2eResult<()> {
        self.call(BridgeOp::WaitForLoad).await?;
        Ok(())
    }

    /// Close the browser and wait for the bridge to exit
    async fn close(&self) -> E2eResult<()> {
        if let Err(e) = self.call(BridgeOp::Close).await {
            warn!("bridge close failed: {}", e);
        }
        if let Some(mut bridge) = self.bridge.lock().await.take() {
            bridge.child.wait().await?;
        }
        Ok(())
    }
}

/// Build the bridge script for a session
pub fn build_script(config: &PlaywrightConfig) -> String {
    let mut script = format!(
        r#"
const {{ {browser} }} = require('playwright');
const readline = require('readline');

const LAUNCH = {{ headless: {headless} }};
const VIEWPORT = {{ width: {width}, height: {height} }};
const ACTION_TIMEOUT = {timeout};
const BROWSER = {browser};
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
        timeout = config.action_timeout_ms,
    );
    script.push_str(BRIDGE_BODY);
    script
}

const BRIDGE_BODY: &str = r#"
const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

const snapshot = (els) => els.map((e) => {
  const attributes = {};
  for (const a of e.attributes) attributes[a.name] = a.value;
  const style = window.getComputedStyle(e);
  const visible = style.visibility !== 'hidden' && style.display !== 'none'
    && e.getClientRects().length > 0;
  return {
    tag: e.tagName.toLowerCase(),
    text: (e.innerText || e.textContent || ''),
    html: e.outerHTML,
    attributes,
    visible,
  };
});

async function handle(page, req) {
  switch (req.op) {
    case 'goto':
      await page.goto(req.url, { waitUntil: 'domcontentloaded' });
      return null;
    case 'url':
      return page.url();
    case 'query':
      return await page.$$eval(req.selector, snapshot);
    case 'click':
      await page.locator(req.selector).nth(req.index).click();
      return null;
    case 'fill':
      await page.locator(req.selector).nth(req.index).fill(req.value);
      return null;
    case 'select':
      await page.locator(req.selector).nth(req.index).selectOption(req.value);
      return null;
    case 'wait_for_load':
      await page.waitForLoadState('load');
      return null;
    default:
      throw new Error('unknown op ' + req.op);
  }
}

(async () => {
  let browser;
  try {
    browser = await BROWSER.launch(LAUNCH);
    const context = await browser.newContext({ viewport: VIEWPORT });
    context.setDefaultTimeout(ACTION_TIMEOUT);
    const page = await context.newPage();
    reply({ ready: true });

    const lines = readline.createInterface({ input: process.stdin });
    for await (const line of lines) {
      if (!line.trim()) continue;
      const req = JSON.parse(line);
      if (req.op === 'close') {
        reply({ id: req.id, ok: true, result: null });
        break;
      }
      try {
        reply({ id: req.id, ok: true, result: await handle(page, req) });
      } catch (error) {
        reply({ id: req.id, ok: false, error: error.message });
      }
    }
  } catch (error) {
    reply({ ready: false, error: error.message });
  } finally {
    if (browser) await browser.close();
  }
})();
"#;
