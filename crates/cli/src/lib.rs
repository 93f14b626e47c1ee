//! shopcheck CLI
//!
//! Command-line surface over the storefront reader, flow sequencer and
//! scenario runner.

pub mod client;
pub mod commands;
pub mod output;
pub mod settings;
