//! Scenario runner: one isolated browser session per scenario

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use shopcheck_common::RunConfig;

use crate::error::{E2eError, E2eResult};
use crate::page::Page;
use crate::playwright::{PlaywrightConfig, PlaywrightPage};
use crate::scenario::{Scenario, ScenarioContext};
use crate::sequencer::FlowSequencer;

/// Page text kept in a failure report
const EXCERPT_CHARS: usize = 600;

/// Bound for collecting diagnostics after a failure
const DIAGNOSTICS_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a fresh, isolated page for each scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> E2eResult<Box<dyn Page>>;
}

/// Browser sessions backed by Playwright
pub struct PlaywrightSessions {
    config: PlaywrightConfig,
}

impl PlaywrightSessions {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for PlaywrightSessions {
    async fn open(&self) -> E2eResult<Box<dyn Page>> {
        Ok(Box::new(PlaywrightPage::launch(&self.config).await?))
    }
}

/// Result of a single scenario step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Where the page was when a scenario failed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub url: Option<String>,
    pub text_excerpt: Option<String>,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

impl TestResult {
    fn failed_before_start(name: &str, error: &E2eError) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms: 0,
            steps: vec![],
            error: Some(error.to_string()),
            diagnostics: None,
        }
    }
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub base_url: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs scenarios against the storefront
pub struct TestRunner<F> {
    config: RunConfig,
    sessions: F,
    output_dir: PathBuf,
}

impl<F: SessionFactory> TestRunner<F> {
    pub fn new(config: RunConfig, sessions: F) -> Self {
        Self {
            config,
            sessions,
            output_dir: PathBuf::from("test-results"),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn sessions(&self) -> &F {
        &self.sessions
    }

    /// Run scenarios, up to `parallelism` at a time; results keep scenario order
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> TestSuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let parallelism = self.config.parallelism.max(1);

        info!(
            "Running {} scenario(s) against {} ({} at a time)...",
            scenarios.len(),
            self.config.base_url,
            parallelism
        );

        let results: Vec<TestResult> = stream::iter(scenarios)
            .map(|scenario| self.run_scenario(scenario))
            .buffered(parallelism)
            .collect()
            .await;

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        TestSuiteResult {
            started_at,
            base_url: self.config.base_url.clone(),
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run one scenario in its own session
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let page = match self.sessions.open().await {
            Ok(page) => page,
            Err(e) => {
                error!("✗ {} - could not open a session: {}", scenario.name, e);
                return TestResult::failed_before_start(&scenario.name, &e);
            }
        };

        let result = self.run_on(page.as_ref(), scenario).await;
        if let Err(e) = page.close().await {
            warn!("closing session for {} failed: {}", scenario.name, e);
        }

        if result.success {
            info!("✓ {} ({} ms)", result.name, result.duration_ms);
        } else {
            error!(
                "✗ {} - {}",
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        result
    }

    /// Run a scenario on an already open page
    pub async fn run_on(&self, page: &dyn Page, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let flows = FlowSequencer::from_config(&self.config);
        let mut ctx = ScenarioContext::new(self.config.free_shipping);
        let step_timeout = self.config.timing.operation_timeout();

        let mut step_results = Vec::new();
        let mut scenario_error: Option<String> = None;

        for step in &scenario.steps {
            let step_name = step.name();
            let step_start = Instant::now();
            debug!("Executing step: {}", step_name);

            let outcome = match tokio::time::timeout(step_timeout, ctx.run_step(&flows, page, step)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(E2eError::Timeout(format!(
                    "step {} exceeded {:?}",
                    step_name, step_timeout
                ))),
            };
            let duration_ms = step_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => step_results.push(StepResult {
                    success: true,
                    step_name,
                    duration_ms,
                    error: None,
                }),
                Err(e) => {
                    let failure = E2eError::StepFailed {
                        step: step_name.clone(),
                        reason: e.to_string(),
                    };
                    step_results.push(StepResult {
                        success: false,
                        step_name,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                    scenario_error = Some(failure.to_string());
                    break; // Stop on first failure
                }
            }
        }

        let diagnostics = match scenario_error {
            Some(_) => Some(collect_diagnostics(page).await),
            None => None,
        };

        TestResult {
            name: scenario.name.clone(),
            success: scenario_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: step_results,
            error: scenario_error,
            diagnostics,
        }
    }

    /// Write scenario results to a JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("shopcheck-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Current URL and a text excerpt, best effort
pub async fn collect_diagnostics(page: &dyn Page) -> Diagnostics {
    let url = tokio::time::timeout(DIAGNOSTICS_TIMEOUT, page.current_url())
        .await
        .ok()
        .and_then(Result::ok);
    let text_excerpt = tokio::time::timeout(DIAGNOSTICS_TIMEOUT, page.body_text())
        .await
        .ok()
        .and_then(Result::ok)
        .map(|text| excerpt(&text, EXCERPT_CHARS));
    Diagnostics { url, text_excerpt }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
