//! Error types for storefront flows

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Storefront unreachable at {url} after {attempts} attempts")]
    StorefrontHealthCheck { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Unsupported on this page: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<shopcheck_common::Error> for E2eError {
    fn from(e: shopcheck_common::Error) -> Self {
        match e {
            shopcheck_common::Error::Parse { input, reason } => {
                E2eError::Parse(format!("price {input:?}: {reason}"))
            }
            shopcheck_common::Error::Io(io) => E2eError::Io(io),
            other => E2eError::Config(other.to_string()),
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
