//! Page state reader
//!
//! Turns a rendered storefront page into [`ProductCard`]s, [`CartLine`]s, an
//! [`OrderTotal`] and a [`ShippingAvailability`], whichever of the two
//! markups ([`RenderMode`]) produced it.
//!
//! Each markup is a [`StateSource`]. The reader probes the page for the
//! markers of each source once per read and consults the sources active
//! first, so no read operation branches on the mode itself.

mod blocks;
mod classic;

pub use blocks::BlocksSource;
pub use classic::ClassicSource;

use async_trait::async_trait;
use tracing::{debug, warn};

use shopcheck_common::{
    find_amount, find_money, parse_amount_in, parse_price, CartLine, OrderTotal, ProductCard,
    PurchaseAction, RenderMode, ShippingAvailability, ShippingOption, TimingConfig,
};

use crate::error::{E2eError, E2eResult};
use crate::page::{Element, Page};
use crate::wait::{Poll, Polls};

/// Known locations of the final amount, tried after every container search failed
const KNOWN_TOTAL_VALUES: &[&str] = &[
    ".order-total .woocommerce-Price-amount",
    ".order-total td",
    ".wc-block-components-totals-footer-item .wc-block-components-totals-item__value",
    ".wc-block-components-totals-footer-item-tax-value",
];

/// Which totals containers to search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsScope {
    Cart,
    Checkout,
}

/// Shipping methods and summary text rendered by one markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingSnapshot {
    /// Methods with a selector input
    pub options: Vec<ShippingOption>,
    /// Shipping summary text outside the method inputs
    pub summary: Vec<String>,
}

/// Selectors a flow needs to act on a page of one markup
#[derive(Debug)]
pub struct Affordances {
    pub remove_line: &'static str,
    pub proceed_to_checkout: &'static str,
    pub checkout_form: &'static str,
    pub place_order: &'static str,
    pub payment_options: &'static str,
    pub view_cart: &'static str,
    pub add_to_cart_submit: &'static str,
    pub option_selects: &'static str,
}

/// One storefront markup, able to report the page state it renders
#[async_trait]
pub trait StateSource: Send + Sync {
    fn mode(&self) -> RenderMode;

    /// Selectors only this markup renders
    fn markers(&self) -> &'static [&'static str];

    /// Subset of the markers that only a cart page renders
    fn cart_markers(&self) -> &'static [&'static str];

    fn affordances(&self) -> &'static Affordances;

    /// Totals containers for a scope, in search order
    fn totals_containers(&self, scope: TotalsScope) -> &'static [&'static str];

    /// Visible while totals are being recomputed
    fn recalculation_indicator(&self) -> &'static str;

    async fn list_products(&self, page: &dyn Page) -> E2eResult<Vec<ProductCard>>;

    async fn list_cart_lines(&self, page: &dyn Page) -> E2eResult<Vec<CartLine>>;

    /// One pass over the scope's totals containers; `None` when nothing monetary is rendered
    async fn read_total(&self, page: &dyn Page, scope: TotalsScope) -> E2eResult<Option<f64>>;

    async fn read_shipping_options(&self, page: &dyn Page) -> E2eResult<ShippingSnapshot>;

    async fn is_present(&self, page: &dyn Page) -> E2eResult<bool> {
        Ok(page.count(&self.markers().join(", ")).await? > 0)
    }

    async fn shows_cart(&self, page: &dyn Page) -> E2eResult<bool> {
        Ok(page.count(&self.cart_markers().join(", ")).await? > 0)
    }

    async fn is_recalculating(&self, page: &dyn Page) -> E2eResult<bool> {
        page.is_visible(self.recalculation_indicator()).await
    }

    async fn has_totals_container(&self, page: &dyn Page) -> E2eResult<bool> {
        let all: Vec<&str> = self
            .totals_containers(TotalsScope::Cart)
            .iter()
            .chain(self.totals_containers(TotalsScope::Checkout))
            .copied()
            .collect();
        Ok(page.count(&all.join(", ")).await? > 0)
    }
}

/// Reads normalized storefront state from whichever markup is active
pub struct PageStateReader {
    classic: ClassicSource,
    blocks: BlocksSource,
    polls: Polls,
}

impl Default for PageStateReader {
    fn default() -> Self {
        Self::new(Polls::default())
    }
}

impl PageStateReader {
    pub fn new(polls: Polls) -> Self {
        Self {
            classic: ClassicSource,
            blocks: BlocksSource,
            polls,
        }
    }

    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(Polls::from(timing))
    }

    pub fn polls(&self) -> &Polls {
        &self.polls
    }

    pub fn source(&self, mode: RenderMode) -> &dyn StateSource {
        match mode {
            RenderMode::Classic => &self.classic,
            RenderMode::Blocks => &self.blocks,
        }
    }

    /// Markup whose markers the page currently shows
    pub async fn probe(&self, page: &dyn Page) -> E2eResult<Option<RenderMode>> {
        if self.blocks.is_present(page).await? {
            return Ok(Some(RenderMode::Blocks));
        }
        if self.classic.is_present(page).await? {
            return Ok(Some(RenderMode::Classic));
        }
        Ok(None)
    }

    /// Whether either markup renders a cart (filled or empty)
    pub async fn shows_cart(&self, page: &dyn Page) -> E2eResult<bool> {
        Ok(self.blocks.shows_cart(page).await? || self.classic.shows_cart(page).await?)
    }

    /// Both sources, the probed one first (classic when nothing matched)
    pub async fn sources(&self, page: &dyn Page) -> E2eResult<[&dyn StateSource; 2]> {
        let mode = self.probe(page).await?;
        debug!("render mode probe: {:?}", mode);
        Ok(match mode {
            Some(RenderMode::Blocks) => [&self.blocks, &self.classic],
            _ => [&self.classic, &self.blocks],
        })
    }

    /// Listing entries in document order
    pub async fn list_products(&self, page: &dyn Page) -> E2eResult<Vec<ProductCard>> {
        for source in self.sources(page).await? {
            let cards = source.list_products(page).await?;
            if !cards.is_empty() {
                debug!("{} listing entries ({})", cards.len(), source.mode());
                return Ok(cards);
            }
        }
        Err(E2eError::NotFound(
            "listing entries at primary or fallback location".to_string(),
        ))
    }

    /// Cart lines of both markups from a single look, no waiting
    pub async fn cart_lines_now(&self, page: &dyn Page) -> E2eResult<Vec<CartLine>> {
        let mut lines = Vec::new();
        for source in self.sources(page).await? {
            lines.extend(source.list_cart_lines(page).await?);
        }
        Ok(lines)
    }

    /// Cart lines, waiting a bounded time for rows to render.
    ///
    /// An empty cart is a valid result.
    pub async fn read_cart(&self, page: &dyn Page) -> E2eResult<Vec<CartLine>> {
        let lines = self
            .polls
            .cart
            .until(|| async move {
                let lines = self.cart_lines_now(page).await?;
                Ok((!lines.is_empty()).then_some(lines))
            })
            .await?;
        Ok(lines.unwrap_or_default())
    }

    /// Wait until no markup shows a recalculation indicator
    pub async fn wait_until_settled(&self, page: &dyn Page) -> E2eResult<bool> {
        let settled = self
            .polls
            .settle
            .until_true(|| async move {
                Ok(!self.classic.is_recalculating(page).await?
                    && !self.blocks.is_recalculating(page).await?)
            })
            .await?;
        if !settled {
            warn!("totals still recalculating after {} attempts", self.polls.settle.attempts);
        }
        Ok(settled)
    }

    /// Order total at cart or checkout
    pub async fn read_total(&self, page: &dyn Page) -> E2eResult<OrderTotal> {
        let attached = self
            .polls
            .attach
            .until_true(|| async move {
                Ok(self.classic.has_totals_container(page).await?
                    || self.blocks.has_totals_container(page).await?)
            })
            .await?;
        if !attached {
            debug!("no totals container attached, trying fallbacks");
        }
        self.wait_until_settled(page).await?;

        let sources = self.sources(page).await?;
        let retries = Poll::new(self.polls.attach.interval, self.polls.total_retries);
        let cart_total = retries
            .until(|| async move {
                for source in sources {
                    if let Some(amount) = source.read_total(page, TotalsScope::Cart).await? {
                        return Ok(Some(amount));
                    }
                }
                Ok(None)
            })
            .await?;
        if let Some(amount) = cart_total {
            return Ok(OrderTotal { amount });
        }

        for source in sources {
            if let Some(amount) = source.read_total(page, TotalsScope::Checkout).await? {
                return Ok(OrderTotal { amount });
            }
        }

        for selector in KNOWN_TOTAL_VALUES {
            for el in page.query(selector).await? {
                if let Some(amount) = find_amount(&el.text) {
                    return Ok(OrderTotal {
                        amount: parse_price(amount)?,
                    });
                }
            }
        }

        Err(E2eError::NotFound(format!(
            "order total on {}",
            page.current_url().await.unwrap_or_default()
        )))
    }

    /// Shipping availability across both markups
    pub async fn read_shipping(&self, page: &dyn Page) -> E2eResult<ShippingAvailability> {
        self.wait_until_settled(page).await?;

        let sources = self.sources(page).await?;
        let snapshot = self
            .polls
            .attach
            .until(|| async move {
                let mut merged = ShippingSnapshot::default();
                for source in sources {
                    let snap = source.read_shipping_options(page).await?;
                    merged.options.extend(snap.options);
                    merged.summary.extend(snap.summary);
                }
                let rendered = !merged.options.is_empty() || !merged.summary.is_empty();
                Ok(rendered.then_some(merged))
            })
            .await?
            .unwrap_or_default();

        Ok(availability_from(&snapshot))
    }

    /// A free shipping method is offered
    pub async fn free_shipping_available(&self, page: &dyn Page) -> E2eResult<bool> {
        Ok(self.read_shipping(page).await?.free_available)
    }

    /// Only paid shipping is offered (see [`ShippingAvailability::only_paid`])
    pub async fn only_paid_shipping_available(&self, page: &dyn Page) -> E2eResult<bool> {
        let availability = self.read_shipping(page).await?;
        if !availability.ui_present {
            warn!("no shipping UI rendered; reporting paid-only without confirmation");
        }
        Ok(availability.only_paid())
    }
}

/// Fold rendered shipping methods and summaries into availability flags
pub fn availability_from(snapshot: &ShippingSnapshot) -> ShippingAvailability {
    let mentions_free = |text: &str| text.to_lowercase().contains("free");

    let free_by_input = snapshot.options.iter().any(ShippingOption::encodes_free_shipping);
    let free_by_text = snapshot
        .summary
        .iter()
        .map(String::as_str)
        .chain(snapshot.options.iter().map(|o| o.label.as_str()))
        .any(mentions_free);
    let paid_available = snapshot
        .options
        .iter()
        .any(|o| o.value.is_some() && !o.encodes_free_shipping() && !mentions_free(&o.label));

    ShippingAvailability {
        free_available: free_by_input || free_by_text,
        paid_available,
        methods_present: snapshot.options.iter().any(|o| o.value.is_some()),
        ui_present: !snapshot.options.is_empty() || !snapshot.summary.is_empty(),
    }
}

/// Where a markup renders listing entries and their parts
pub(crate) struct CardMarkup {
    /// Primary entry location, then the fallback
    pub entries: [&'static str; 2],
    pub name: &'static [&'static str],
    pub sale_price: &'static [&'static str],
    pub price: &'static [&'static str],
    pub sale_badge: &'static [&'static str],
    pub add_button: &'static [&'static str],
    pub detail_link: &'static [&'static str],
}

/// Where a markup renders cart rows
pub(crate) struct CartMarkup {
    pub rows: &'static str,
    pub name: &'static [&'static str],
}

/// Where a markup renders totals rows inside a container
pub(crate) struct TotalsMarkup {
    pub rows: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

pub(crate) fn first_text(el: &Element, selectors: &[&str]) -> E2eResult<Option<String>> {
    for selector in selectors {
        if let Some(text) = el.text_of(selector)? {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

fn any_match(el: &Element, selectors: &[&str]) -> E2eResult<bool> {
    for selector in selectors {
        if el.find_first(selector)?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn usable_href(el: &Element) -> Option<String> {
    el.attr("href")
        .filter(|h| !h.is_empty() && *h != "#")
        .map(str::to_string)
}

fn detail_link(entry: &Element, markup: &CardMarkup) -> E2eResult<Option<String>> {
    for selector in markup.detail_link {
        for link in entry.find(selector)? {
            if let Some(href) = usable_href(&link) {
                return Ok(Some(href));
            }
        }
    }
    Ok(None)
}

fn purchase_action(entry: &Element, markup: &CardMarkup) -> E2eResult<PurchaseAction> {
    for selector in markup.add_button {
        let Some(button) = entry.find_first(selector)? else {
            continue;
        };
        let href = usable_href(&button);
        let product_id = button
            .attr("data-product_id")
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let direct = button.has_class("ajax_add_to_cart")
            || button.has_class("product_type_simple")
            || href.as_deref().map(|h| h.contains("add-to-cart=")).unwrap_or(false)
            || (button.tag == "button" && product_id.is_some());

        if direct {
            return Ok(PurchaseAction::AddToCart { product_id, href });
        }
        let url = match href {
            Some(href) => Some(href),
            None => detail_link(entry, markup)?,
        };
        return Ok(PurchaseAction::ViewDetails { url });
    }
    Ok(PurchaseAction::ViewDetails {
        url: detail_link(entry, markup)?,
    })
}

/// Build a card from one listing entry
pub(crate) fn card_from_entry(
    entry: &Element,
    position: usize,
    markup: &CardMarkup,
) -> E2eResult<ProductCard> {
    let name = first_text(entry, markup.name)?.unwrap_or_else(|| format!("Product {}", position + 1));

    let sale_text = first_text(entry, markup.sale_price)?;
    let on_sale = sale_text.is_some() || any_match(entry, markup.sale_badge)?;
    let price_text = match sale_text {
        Some(text) => text,
        None => first_text(entry, markup.price)?
            .ok_or_else(|| E2eError::NotFound(format!("price of listing entry {name:?}")))?,
    };
    let price = parse_amount_in(&price_text)?;
    if price <= 0.0 {
        return Err(E2eError::Parse(format!(
            "listing entry {name:?} has non-positive price {price} ({price_text:?})"
        )));
    }

    Ok(ProductCard {
        name,
        price,
        on_sale,
        action: purchase_action(entry, markup)?,
        position,
    })
}

/// Listing entries at the primary location, else the fallback
pub(crate) async fn cards_at(page: &dyn Page, markup: &CardMarkup) -> E2eResult<Vec<ProductCard>> {
    for location in markup.entries {
        let entries = page.query(location).await?;
        if entries.is_empty() {
            continue;
        }
        return entries
            .iter()
            .enumerate()
            .map(|(position, entry)| card_from_entry(entry, position, markup))
            .collect();
    }
    Ok(Vec::new())
}

pub(crate) async fn cart_lines_at(page: &dyn Page, markup: &CartMarkup) -> E2eResult<Vec<CartLine>> {
    let mut lines = Vec::new();
    for row in page.query(markup.rows).await? {
        let name = first_text(&row, markup.name)?.unwrap_or_else(|| row.text.clone());
        if !name.is_empty() {
            lines.push(CartLine { name });
        }
    }
    Ok(lines)
}

/// Whether a totals label names the grand total ("Total", "Order total",
/// "Estimated total"), never a subtotal
pub fn is_total_label(label: &str) -> bool {
    let label = label.trim().trim_end_matches(':').trim().to_lowercase();
    label == "total" || label.starts_with("total ") || label.ends_with(" total")
}

/// Labelled total row first, then the first money-looking text of the container
pub(crate) async fn total_in(
    page: &dyn Page,
    containers: &[&str],
    markup: &TotalsMarkup,
) -> E2eResult<Option<f64>> {
    for selector in containers {
        for container in page.query(selector).await? {
            for row in container.find(markup.rows)? {
                let label = row.text_of(markup.label)?.unwrap_or_default();
                if !is_total_label(&label) {
                    continue;
                }
                let value = row.text_of(markup.value)?.unwrap_or_else(|| row.text.clone());
                if find_amount(&value).is_some() {
                    return Ok(Some(parse_amount_in(&value)?));
                }
            }
            if let Some(money) = find_money(&container.text) {
                return Ok(Some(parse_price(money)?));
            }
        }
    }
    Ok(None)
}
