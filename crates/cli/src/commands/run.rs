//! Scenario run command

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use shopcheck_e2e::runner::TestResult;
use shopcheck_e2e::{wait_for_storefront, HealthCheck, Scenario, TestRunner};

use crate::client::StorefrontClient;
use crate::output::{print_error, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct RunArgs {
    /// Directory of YAML scenarios
    #[arg(short, long, default_value = "scenarios")]
    pub scenarios: PathBuf,

    /// Run only scenarios with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,

    /// Do not wait for the storefront before starting
    #[arg(long)]
    pub no_wait: bool,
}

/// Scenario result display wrapper for serialization
#[derive(Serialize)]
pub struct ScenarioDisplay {
    pub name: String,
    pub success: bool,
    pub steps: usize,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub url: Option<String>,
}

impl From<&TestResult> for ScenarioDisplay {
    fn from(result: &TestResult) -> Self {
        Self {
            name: result.name.clone(),
            success: result.success,
            steps: result.steps.len(),
            duration_ms: result.duration_ms,
            error: result.error.clone(),
            url: result.diagnostics.as_ref().and_then(|d| d.url.clone()),
        }
    }
}

impl TableDisplay for ScenarioDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Scenario", "Result", "Steps", "Duration", "Error"]
    }

    fn row(&self) -> Vec<String> {
        let error = match (&self.error, &self.url) {
            (Some(error), Some(url)) => format!("{} (at {})", error, url),
            (Some(error), None) => error.clone(),
            _ => String::new(),
        };
        vec![
            self.name.clone(),
            if self.success { "pass" } else { "FAIL" }.to_string(),
            self.steps.to_string(),
            format!("{}ms", self.duration_ms),
            error,
        ]
    }
}

/// Pick the scenarios to run
pub fn select(all: &[Scenario], tag: Option<&str>, name: Option<&str>) -> Vec<Scenario> {
    let tagged = match tag {
        Some(tag) => Scenario::filter_by_tag(all, tag),
        None => all.iter().collect(),
    };
    tagged
        .into_iter()
        .filter(|s| name.map_or(true, |name| s.name == name))
        .cloned()
        .collect()
}

/// Returns whether every selected scenario passed
pub async fn execute(args: RunArgs, client: StorefrontClient, format: OutputFormat) -> Result<bool> {
    let all = Scenario::load_all(&args.scenarios)
        .with_context(|| format!("loading scenarios from {}", args.scenarios.display()))?;
    let scenarios = select(&all, args.tag.as_deref(), args.name.as_deref());
    if scenarios.is_empty() {
        bail!("no scenarios selected from {}", args.scenarios.display());
    }
    info!("{} scenario(s) selected", scenarios.len());

    if !args.no_wait {
        wait_for_storefront(&HealthCheck::new(client.config().base_url.clone())).await?;
    }

    let runner = TestRunner::new(client.config().clone(), client.sessions())
        .with_output_dir(&args.output);
    let suite = runner.run_scenarios(&scenarios).await;
    let path = runner.write_results(&suite)?;

    let displays: Vec<ScenarioDisplay> = suite.results.iter().map(ScenarioDisplay::from).collect();
    print_list(&displays, "No scenarios ran.", format);

    let summary = format!(
        "{}/{} scenarios passed in {}ms, results in {}",
        suite.passed,
        suite.total,
        suite.duration_ms,
        path.display()
    );
    if suite.success() {
        print_success(&summary);
    } else {
        print_error(&summary);
    }
    Ok(suite.success())
}
