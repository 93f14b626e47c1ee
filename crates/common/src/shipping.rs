//! Storefront shipping policy
//!
//! The storefront decides free-shipping eligibility in two stages: the
//! free-shipping method's own minimum-amount rule, then a site hook that
//! withdraws free shipping whenever the cart holds a discounted item.
//! Scenarios use this module to compute what the rendered shipping options
//! ought to show.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A cart item as far as the shipping hook cares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub price: f64,
    pub on_sale: bool,
}

/// The site hook: pass `is_available` through unless any item is on sale.
///
/// Pure function of the cart at evaluation time.
pub fn filter_free_shipping(is_available: bool, cart: &[CartItem]) -> bool {
    if let Some(item) = cart.iter().find(|item| item.on_sale) {
        debug!("free shipping withdrawn: {:?} is on sale", item.name);
        return false;
    }
    is_available
}

/// Minimum-amount rule of the free shipping method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeShippingRule {
    pub min_amount: f64,
}

impl Default for FreeShippingRule {
    fn default() -> Self {
        Self { min_amount: 100.0 }
    }
}

impl FreeShippingRule {
    /// Eligibility before the hook runs
    pub fn is_eligible(&self, cart_total: f64) -> bool {
        cart_total >= self.min_amount
    }

    /// Final availability: the rule, then the hook
    pub fn evaluate(&self, cart_total: f64, cart: &[CartItem]) -> bool {
        filter_free_shipping(self.is_eligible(cart_total), cart)
    }
}
