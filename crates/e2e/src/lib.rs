//! shopcheck storefront flows
//!
//! Reads normalized state from storefront pages rendered in either the
//! classic or the blocks markup, and drives shopping journeys through them:
//! - [`PageStateReader`] turns a page into products, cart lines, totals and
//!   shipping availability
//! - [`FlowSequencer`] browses, adds to cart, empties the cart, checks out
//! - [`TestRunner`] executes declarative YAML [`Scenario`]s, each in its own
//!   Playwright session
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TestRunner                                                  │
//! │    ├── SessionFactory::open() -> Box<dyn Page>               │
//! │    └── ScenarioContext::run_step(step)  (per-step timeout)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FlowSequencer  ──────────►  PageStateReader                 │
//! │                                 ├── ClassicSource            │
//! │                                 └── BlocksSource             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page                                                        │
//! │    ├── PlaywrightPage  (node bridge, JSON lines)             │
//! │    └── SnapshotPage    (saved HTML, read-only)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod html;
pub mod page;
pub mod playwright;
pub mod reader;
pub mod runner;
pub mod scenario;
pub mod sequencer;
pub mod server;
pub mod wait;

pub use error::{E2eError, E2eResult};
pub use html::SnapshotPage;
pub use page::{Element, Page};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightPage};
pub use reader::{PageStateReader, StateSource, TotalsScope};
pub use runner::{PlaywrightSessions, SessionFactory, TestResult, TestRunner, TestSuiteResult};
pub use scenario::{ProductFilter, Scenario, ScenarioContext, ScenarioStep};
pub use sequencer::FlowSequencer;
pub use server::{wait_for_storefront, HealthCheck};
pub use wait::{Poll, Polls};
