//! shopcheck Common Library
//!
//! Storefront domain snapshots, price normalization, the shipping policy the
//! storefront applies, and run configuration shared by the runner and CLI.

pub mod config;
pub mod error;
pub mod price;
pub mod shipping;
pub mod types;

// Re-export commonly used types
pub use config::{CheckoutDetails, PathsConfig, RunConfig, TimingConfig};
pub use error::{Error, Result};
pub use price::{find_amount, find_money, parse_amount_in, parse_price};
pub use shipping::{filter_free_shipping, CartItem, FreeShippingRule};
pub use types::*;

/// shopcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
