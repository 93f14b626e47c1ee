//! Read state from a saved page

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use shopcheck_e2e::{E2eError, PageStateReader, Poll, Polls, SnapshotPage};

use super::store::{CartLineDisplay, ProductDisplay, ShippingDisplay, TotalDisplay};
use crate::output::{print_heading, print_item, print_list, print_warning, OutputFormat};

#[derive(Args)]
pub struct InspectArgs {
    /// Saved HTML of a listing, cart or checkout page
    pub file: PathBuf,
}

/// Everything readable from one page
#[derive(Serialize)]
struct InspectReport {
    file: String,
    mode: Option<String>,
    products: Vec<ProductDisplay>,
    cart: Vec<CartLineDisplay>,
    total: Option<TotalDisplay>,
    shipping: ShippingDisplay,
}

pub async fn execute(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let page = SnapshotPage::from_file(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let reader = PageStateReader::new(Polls {
        cart: Poll::once(),
        attach: Poll::once(),
        settle: Poll::once(),
        removal: Poll::once(),
        total_retries: 1,
    });

    let mode = reader.probe(&page).await?;
    let products = match reader.list_products(&page).await {
        Ok(cards) => cards,
        Err(E2eError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let cart = reader.read_cart(&page).await?;
    let total = match reader.read_total(&page).await {
        Ok(total) => Some(total),
        Err(E2eError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };
    let shipping = reader.read_shipping(&page).await?;

    let report = InspectReport {
        file: args.file.display().to_string(),
        mode: mode.map(|m| m.to_string()),
        products: products.into_iter().map(ProductDisplay::from).collect(),
        cart: cart.into_iter().map(CartLineDisplay::from).collect(),
        total: total.map(TotalDisplay::from),
        shipping: ShippingDisplay::from(shipping),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Table | OutputFormat::Plain => print_report(&report, format),
    }
    Ok(())
}

fn print_report(report: &InspectReport, format: OutputFormat) {
    match &report.mode {
        Some(mode) => println!("{} ({} markup)", report.file, mode),
        None => print_warning(&format!("{}: no storefront markup recognised", report.file)),
    }

    print_heading("Products", format);
    print_list(&report.products, "none", format);

    print_heading("Cart", format);
    print_list(&report.cart, "none", format);

    print_heading("Total", format);
    match &report.total {
        Some(total) => print_item(total, format),
        None => println!("none"),
    }

    print_heading("Shipping", format);
    print_item(&report.shipping, format);
}
