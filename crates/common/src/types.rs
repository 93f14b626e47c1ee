//! Core types for shopcheck
//!
//! Every value here is a read-only snapshot of what a storefront page showed
//! at the moment it was read. Nothing is cached between reads.

use serde::{Deserialize, Serialize};

/// Which markup produced a storefront page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Template-rendered pages (shortcode cart/checkout, `ul.products` listings)
    Classic,
    /// Component-rendered pages (cart/checkout/product-collection blocks)
    Blocks,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::Classic
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderMode::Classic => write!(f, "classic"),
            RenderMode::Blocks => write!(f, "blocks"),
        }
    }
}

/// How a listing entry can be put into the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PurchaseAction {
    /// One-step add; the entry carries a product id and/or an add-to-cart link
    AddToCart {
        product_id: Option<String>,
        href: Option<String>,
    },
    /// Options must be chosen on the product page first
    ViewDetails { url: Option<String> },
}

impl PurchaseAction {
    pub fn is_direct(&self) -> bool {
        matches!(self, PurchaseAction::AddToCart { .. })
    }
}

/// One catalog entry as rendered in a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    pub name: String,
    /// Currently effective price (the reduced price when on sale)
    pub price: f64,
    pub on_sale: bool,
    pub action: PurchaseAction,
    /// Zero-based document position within the listing
    pub position: usize,
}

/// One cart line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
}

/// Monetary total shown at cart or checkout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderTotal {
    pub amount: f64,
}

/// One shipping method offered by the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub label: String,
    /// Value of the method's selector input, e.g. `free_shipping:3`
    pub value: Option<String>,
}

impl ShippingOption {
    /// Whether the input value encodes the free shipping method
    pub fn encodes_free_shipping(&self) -> bool {
        self.value
            .as_deref()
            .map(|v| v.to_ascii_lowercase().contains("free_shipping"))
            .unwrap_or(false)
    }
}

/// Free/paid shipping availability as rendered at cart or checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAvailability {
    /// A free shipping method is offered
    pub free_available: bool,
    /// At least one non-free method input is offered
    pub paid_available: bool,
    /// Method selector inputs were rendered
    pub methods_present: bool,
    /// Any shipping UI (method inputs or summary text) was rendered at all
    pub ui_present: bool,
}

impl ShippingAvailability {
    /// Only paid shipping is offered.
    ///
    /// With method inputs rendered this requires a non-free method. Without
    /// inputs it answers `true` even when no shipping UI was rendered at all,
    /// so a `true` with `ui_present == false` is unconfirmed.
    pub fn only_paid(&self) -> bool {
        if self.free_available {
            return false;
        }
        if self.methods_present {
            return self.paid_available;
        }
        true
    }

    /// `only_paid` backed by rendered shipping UI
    pub fn only_paid_confirmed(&self) -> bool {
        self.ui_present && self.only_paid()
    }
}
