//! CLI Commands

pub mod config;
pub mod inspect;
pub mod price;
pub mod run;
pub mod store;
