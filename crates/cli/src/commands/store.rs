//! Storefront Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use std::time::Duration;

use shopcheck_common::{CartLine, OrderTotal, ProductCard, PurchaseAction, ShippingAvailability};
use shopcheck_e2e::{wait_for_storefront, FlowSequencer, HealthCheck, Page};

use crate::client::StorefrontClient;
use crate::output::{print_item, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Subcommand)]
pub enum StoreCommands {
    /// List the catalog entries of the listing page
    Products,

    /// Show the cart lines
    Cart,

    /// Show the order total on the cart page
    Total,

    /// Show shipping availability on the cart page
    Shipping,

    /// Remove every cart line
    EmptyCart,

    /// Wait until the storefront answers
    Health {
        /// Give up after this many seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,

        /// Path to request
        #[arg(long, default_value = "/")]
        path: String,
    },
}

/// Product card display wrapper for serialization
#[derive(Serialize)]
pub struct ProductDisplay {
    pub position: usize,
    pub name: String,
    pub price: f64,
    pub on_sale: bool,
    pub purchase: String,
}

impl From<ProductCard> for ProductDisplay {
    fn from(card: ProductCard) -> Self {
        let purchase = match card.action {
            PurchaseAction::AddToCart { product_id, .. } => match product_id {
                Some(id) => format!("add to cart (#{})", id),
                None => "add to cart".to_string(),
            },
            PurchaseAction::ViewDetails { url } => {
                format!("options at {}", url.unwrap_or_else(|| "?".to_string()))
            }
        };
        Self {
            position: card.position,
            name: card.name,
            price: card.price,
            on_sale: card.on_sale,
            purchase,
        }
    }
}

impl TableDisplay for ProductDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Name", "Price", "Sale", "Purchase"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.position.to_string(),
            self.name.clone(),
            format!("{:.2}", self.price),
            if self.on_sale { "yes" } else { "" }.to_string(),
            self.purchase.clone(),
        ]
    }
}

#[derive(Serialize)]
pub struct CartLineDisplay {
    pub name: String,
}

impl From<CartLine> for CartLineDisplay {
    fn from(line: CartLine) -> Self {
        Self { name: line.name }
    }
}

impl TableDisplay for CartLineDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Product"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

#[derive(Serialize)]
pub struct TotalDisplay {
    pub amount: f64,
}

impl From<OrderTotal> for TotalDisplay {
    fn from(total: OrderTotal) -> Self {
        Self {
            amount: total.amount,
        }
    }
}

impl TableDisplay for TotalDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Total"]
    }

    fn row(&self) -> Vec<String> {
        vec![format!("{:.2}", self.amount)]
    }
}

/// Shipping availability display wrapper for serialization
#[derive(Serialize)]
pub struct ShippingDisplay {
    pub free_available: bool,
    pub paid_available: bool,
    pub ui_present: bool,
    pub only_paid: bool,
    pub only_paid_confirmed: bool,
}

impl From<ShippingAvailability> for ShippingDisplay {
    fn from(availability: ShippingAvailability) -> Self {
        Self {
            free_available: availability.free_available,
            paid_available: availability.paid_available,
            ui_present: availability.ui_present,
            only_paid: availability.only_paid(),
            only_paid_confirmed: availability.only_paid_confirmed(),
        }
    }
}

impl TableDisplay for ShippingDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Free", "Paid", "Shipping UI", "Only paid"]
    }

    fn row(&self) -> Vec<String> {
        let only_paid = match (self.only_paid, self.only_paid_confirmed) {
            (true, true) => "yes",
            (true, false) => "yes (unconfirmed)",
            _ => "no",
        };
        vec![
            self.free_available.to_string(),
            self.paid_available.to_string(),
            self.ui_present.to_string(),
            only_paid.to_string(),
        ]
    }
}

pub async fn execute(cmd: StoreCommands, client: StorefrontClient, format: OutputFormat) -> Result<()> {
    if let StoreCommands::Health { timeout_secs, path } = cmd {
        let check = HealthCheck {
            path,
            timeout: Duration::from_secs(timeout_secs),
            ..HealthCheck::new(client.config().base_url.clone())
        };
        let attempts = wait_for_storefront(&check).await?;
        print_success(&format!("Storefront is up at {} ({} attempts)", check.url(), attempts));
        return Ok(());
    }

    let page = client.open_page().await?;
    let result = read(&cmd, &client.flows(), &page, format).await;
    client.close(page).await;
    result
}

async fn read(
    cmd: &StoreCommands,
    flows: &FlowSequencer,
    page: &dyn Page,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        StoreCommands::Products => {
            let cards = flows.navigate_to_listing(page).await?;
            let displays: Vec<ProductDisplay> = cards.into_iter().map(ProductDisplay::from).collect();
            print_list(&displays, "No products listed.", format);
        }

        StoreCommands::Cart => {
            flows.goto_cart(page).await?;
            let lines = flows.reader().read_cart(page).await?;
            let displays: Vec<CartLineDisplay> = lines.into_iter().map(CartLineDisplay::from).collect();
            print_list(&displays, "Cart is empty.", format);
        }

        StoreCommands::Total => {
            flows.goto_cart(page).await?;
            let total = flows.reader().read_total(page).await?;
            print_item(&TotalDisplay::from(total), format);
        }

        StoreCommands::Shipping => {
            flows.goto_cart(page).await?;
            let availability = flows.reader().read_shipping(page).await?;
            print_item(&ShippingDisplay::from(availability), format);
        }

        StoreCommands::EmptyCart => {
            let removed = flows.empty_cart(page).await?;
            print_success(&format!("Removed {} cart line(s)", removed));
        }

        StoreCommands::Health { .. } => {}
    }

    Ok(())
}
