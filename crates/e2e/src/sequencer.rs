//! Flow sequencer
//!
//! Multi-step storefront journeys (browse, add to cart, checkout, place
//! order) driven through a [`Page`]. Every decision about what exists on the
//! page is delegated to the [`PageStateReader`]; every action is followed by
//! a bounded poll for its effect.

use regex::RegexBuilder;
use tracing::{debug, info, warn};
use url::Url;

use shopcheck_common::{
    CartLine, CheckoutDetails, OrderTotal, PathsConfig, ProductCard, PurchaseAction, RunConfig,
};

use crate::error::{E2eError, E2eResult};
use crate::page::Page;
use crate::reader::{Affordances, PageStateReader};

/// Billing field locations, classic id first, then the blocks ids
const FIRST_NAME: &[&str] = &["#billing_first_name", "#billing-first_name", "#shipping-first_name"];
const LAST_NAME: &[&str] = &["#billing_last_name", "#billing-last_name", "#shipping-last_name"];
const ADDRESS: &[&str] = &["#billing_address_1", "#billing-address_1", "#shipping-address_1"];
const CITY: &[&str] = &["#billing_city", "#billing-city", "#shipping-city"];
const POSTCODE: &[&str] = &["#billing_postcode", "#billing-postcode", "#shipping-postcode"];
const PHONE: &[&str] = &["#billing_phone", "#billing-phone", "#shipping-phone"];
const EMAIL: &[&str] = &["#billing_email", "#email", "input[type=email]"];

/// Direct pay-on-delivery input of the classic checkout
const COD_INPUT: &str = "#payment_method_cod";

/// Path segment of the order confirmation endpoint
const ORDER_RECEIVED: &str = "order-received";

/// Drives shopping flows through a page
pub struct FlowSequencer {
    reader: PageStateReader,
    paths: PathsConfig,
    details: CheckoutDetails,
    confirmation_phrases: Vec<String>,
}

impl FlowSequencer {
    pub fn new(
        reader: PageStateReader,
        paths: PathsConfig,
        details: CheckoutDetails,
        confirmation_phrases: Vec<String>,
    ) -> Self {
        Self {
            reader,
            paths,
            details,
            confirmation_phrases,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            PageStateReader::from_timing(&config.timing),
            config.paths.clone(),
            config.checkout.clone(),
            config.confirmation_phrases.clone(),
        )
    }

    pub fn reader(&self) -> &PageStateReader {
        &self.reader
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    async fn open(&self, page: &dyn Page, path: &str) -> E2eResult<()> {
        debug!("navigating to {}", path);
        page.goto(path).await?;
        page.wait_for_load().await
    }

    /// First affordance selector (active markup first) present on the page
    async fn present(
        &self,
        page: &dyn Page,
        pick: fn(&Affordances) -> &'static str,
    ) -> E2eResult<Option<&'static str>> {
        for source in self.reader.sources(page).await? {
            let selector = pick(source.affordances());
            if page.count(selector).await? > 0 {
                return Ok(Some(selector));
            }
        }
        Ok(None)
    }

    /// Open the listing (then the home page) and return its entries
    pub async fn navigate_to_listing(&self, page: &dyn Page) -> E2eResult<Vec<ProductCard>> {
        for path in [&self.paths.listing, &self.paths.home] {
            match self.open(page, path).await {
                Ok(()) => {}
                Err(E2eError::NotFound(reason)) => {
                    debug!("{} unavailable: {}", path, reason);
                    continue;
                }
                Err(e) => return Err(e),
            }
            match self.reader.list_products(page).await {
                Ok(cards) => return Ok(cards),
                Err(E2eError::NotFound(_)) => debug!("no listing entries at {}", path),
                Err(e) => return Err(e),
            }
        }
        Err(E2eError::NotFound(format!(
            "listing entries at {} or {}",
            self.paths.listing, self.paths.home
        )))
    }

    /// Open the cart at the first configured path that renders cart markup
    pub async fn goto_cart(&self, page: &dyn Page) -> E2eResult<()> {
        for path in &self.paths.cart {
            match self.open(page, path).await {
                Ok(()) => {}
                Err(E2eError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
            if self.reader.shows_cart(page).await? {
                return Ok(());
            }
            debug!("no cart markup at {}", path);
        }
        warn!("no cart path rendered cart markup; using {}", self.paths.primary_cart());
        self.open(page, self.paths.primary_cart()).await
    }

    /// Put one listing entry into the cart
    pub async fn add_to_cart(&self, page: &dyn Page, card: &ProductCard) -> E2eResult<()> {
        match &card.action {
            PurchaseAction::AddToCart { .. } => {
                let id = product_id(&card.action).ok_or_else(|| {
                    E2eError::NotFound(format!("product id for {:?}", card.name))
                })?;
                debug!("adding {:?} by id {}", card.name, id);
                let url = with_query(self.paths.primary_cart(), "add-to-cart", &id);
                self.open(page, &url).await
            }
            PurchaseAction::ViewDetails { url } => {
                let url = url.as_deref().ok_or_else(|| {
                    E2eError::NotFound(format!("product page link for {:?}", card.name))
                })?;
                debug!("adding {:?} from its product page", card.name);
                self.open(page, url).await?;
                self.choose_options(page).await?;

                let submit = self
                    .present(page, |a| a.add_to_cart_submit)
                    .await?
                    .ok_or_else(|| E2eError::NotFound(format!("add-to-cart button for {:?}", card.name)))?;
                page.click(submit, 0).await?;
                page.wait_for_load().await?;

                match self.present(page, |a| a.view_cart).await? {
                    Some(view_cart) => {
                        page.click(view_cart, 0).await?;
                        page.wait_for_load().await
                    }
                    None => self.goto_cart(page).await,
                }
            }
        }
    }

    /// Pick the first enabled value of every option selector on a product page
    async fn choose_options(&self, page: &dyn Page) -> E2eResult<()> {
        let Some(selects) = self.present(page, |a| a.option_selects).await? else {
            return Ok(());
        };
        for (index, select) in page.query(selects).await?.iter().enumerate() {
            let choice = select
                .find("option")?
                .into_iter()
                .filter(|option| !option.is_disabled())
                .find_map(|option| option.attr("value").filter(|v| !v.is_empty()).map(str::to_string));
            match choice {
                Some(value) => {
                    debug!("option {} -> {}", index, value);
                    page.select_option(selects, index, &value).await?;
                }
                None => warn!("option selector {} has no enabled value", index),
            }
        }
        Ok(())
    }

    /// Add the first listing entry accepted by `accept`
    pub async fn add_first_matching<F>(&self, page: &dyn Page, accept: F) -> E2eResult<ProductCard>
    where
        F: Fn(&ProductCard) -> bool,
    {
        let cards = self.navigate_to_listing(page).await?;
        let card = cards
            .into_iter()
            .find(|card| accept(card))
            .ok_or_else(|| E2eError::NotFound("listing entry matching the filter".to_string()))?;
        info!("adding {:?} ({:.2}, on sale: {})", card.name, card.price, card.on_sale);
        self.add_to_cart(page, &card).await?;
        Ok(card)
    }

    /// Remove every cart line, one at a time.
    ///
    /// Returns the number of removals; an empty cart takes zero.
    pub async fn empty_cart(&self, page: &dyn Page) -> E2eResult<usize> {
        self.goto_cart(page).await?;
        let mut remaining = self.reader.read_cart(page).await?.len();
        let mut removed = 0;

        while remaining > 0 {
            let remove = self
                .present(page, |a| a.remove_line)
                .await?
                .ok_or_else(|| E2eError::NotFound(format!("remove control for {remaining} cart lines")))?;
            page.click(remove, 0).await?;
            page.wait_for_load().await?;

            let expected = remaining - 1;
            remaining = self
                .reader
                .polls()
                .removal
                .require(&format!("cart to shrink to {expected} lines"), || async move {
                    let now = self.reader.cart_lines_now(page).await?.len();
                    if now < expected {
                        return Err(E2eError::AssertionFailed(format!(
                            "one removal dropped the cart from {} to {} lines",
                            expected + 1,
                            now
                        )));
                    }
                    Ok((now == expected).then_some(now))
                })
                .await?;
            removed += 1;
            debug!("removed cart line, {} left", remaining);
        }

        info!("cart emptied ({} removals)", removed);
        Ok(removed)
    }

    async fn checkout_present(&self, page: &dyn Page) -> E2eResult<bool> {
        Ok(self.present(page, |a| a.checkout_form).await?.is_some())
    }

    /// Get onto the checkout page
    pub async fn reach_checkout(&self, page: &dyn Page) -> E2eResult<()> {
        if self.checkout_present(page).await? {
            return Ok(());
        }

        self.open(page, &self.paths.checkout).await?;
        if self.checkout_present(page).await? {
            return Ok(());
        }

        debug!("checkout path showed no form, going through the cart");
        self.goto_cart(page).await?;
        if let Some(proceed) = self.present(page, |a| a.proceed_to_checkout).await? {
            page.click(proceed, 0).await?;
            page.wait_for_load().await?;
            if self.checkout_present(page).await? {
                return Ok(());
            }
        }

        Err(E2eError::NotFound(format!(
            "checkout form (via {} or the cart)",
            self.paths.checkout
        )))
    }

    /// Fill the billing fields that exist; returns how many were filled
    pub async fn fill_checkout(&self, page: &dyn Page) -> E2eResult<usize> {
        let d = &self.details;
        let fields: [(&[&str], &str); 7] = [
            (FIRST_NAME, &d.first_name),
            (LAST_NAME, &d.last_name),
            (ADDRESS, &d.address),
            (CITY, &d.city),
            (POSTCODE, &d.postcode),
            (PHONE, &d.phone),
            (EMAIL, &d.email),
        ];

        let mut filled = 0;
        for (selectors, value) in fields {
            for selector in selectors {
                if page.count(selector).await? == 0 {
                    continue;
                }
                match page.fill(selector, 0, value).await {
                    Ok(()) => filled += 1,
                    Err(e) => debug!("could not fill {}: {}", selector, e),
                }
                break;
            }
        }
        debug!("filled {} checkout fields", filled);
        Ok(filled)
    }

    /// Choose a cash/pay-on-delivery method when one is offered
    pub async fn select_pay_on_delivery(&self, page: &dyn Page) -> E2eResult<bool> {
        if page.count(COD_INPUT).await? > 0 {
            match page.click(COD_INPUT, 0).await {
                Ok(()) => return Ok(true),
                Err(e) => debug!("could not click {}: {}", COD_INPUT, e),
            }
        }

        for source in self.reader.sources(page).await? {
            let selector = source.affordances().payment_options;
            let options = page.query(selector).await?;
            let Some(index) = options.iter().position(|option| {
                let text = option.text.to_lowercase();
                text.contains("cash") || text.contains("delivery")
            }) else {
                continue;
            };
            match page.click(selector, index).await {
                Ok(()) => return Ok(true),
                Err(e) => warn!("could not select pay on delivery: {}", e),
            }
        }
        debug!("no pay-on-delivery option offered");
        Ok(false)
    }

    /// Click the place-order control; `false` when none is rendered
    pub async fn submit_order(&self, page: &dyn Page) -> E2eResult<bool> {
        let Some(place_order) = self.present(page, |a| a.place_order).await? else {
            let url = page.current_url().await?;
            warn!("no place-order control on {}", url);
            return Ok(false);
        };
        page.click(place_order, 0).await?;
        page.wait_for_load().await?;
        Ok(true)
    }

    /// Read the cart and check that every name appears in it
    pub async fn assert_cart_has<S: AsRef<str>>(
        &self,
        page: &dyn Page,
        names: &[S],
    ) -> E2eResult<Vec<CartLine>> {
        let lines = self.reader.read_cart(page).await?;
        let observed: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();

        if lines.len() < names.len() {
            return Err(E2eError::Precondition(format!(
                "expected at least {} cart rows, found {}: {:?}",
                names.len(),
                lines.len(),
                observed
            )));
        }

        if let Some(name) = first_missing(&observed, names)? {
            return Err(E2eError::AssertionFailed(format!(
                "{name:?} not in cart rows {observed:?}"
            )));
        }
        Ok(lines)
    }

    /// Wait for the order-received page and one of the confirmation phrases
    pub async fn assert_order_confirmed(&self, page: &dyn Page) -> E2eResult<()> {
        let confirmed = self
            .reader
            .polls()
            .settle
            .until_true(|| async move {
                if !page.current_url().await?.contains(ORDER_RECEIVED) {
                    return Ok(false);
                }
                let body = page.body_text().await?.to_lowercase();
                Ok(self
                    .confirmation_phrases
                    .iter()
                    .any(|phrase| body.contains(&phrase.to_lowercase())))
            })
            .await?;

        if confirmed {
            info!("order confirmed");
            return Ok(());
        }
        Err(E2eError::AssertionFailed(format!(
            "no order confirmation at {} (expected {:?})",
            page.current_url().await?,
            self.confirmation_phrases
        )))
    }

    /// Add matching entries until their prices sum to `threshold`.
    ///
    /// The order total carries the shipping charge, so the threshold is
    /// checked against the item subtotal of the added cards. Returns the
    /// cards added and the final order total.
    pub async fn add_until_total<F>(
        &self,
        page: &dyn Page,
        accept: F,
        threshold: f64,
        max_items: usize,
    ) -> E2eResult<(Vec<ProductCard>, OrderTotal)>
    where
        F: Fn(&ProductCard) -> bool,
    {
        let mut added: Vec<ProductCard> = Vec::new();
        for _ in 0..max_items {
            added.push(self.add_first_matching(page, &accept).await?);
            let subtotal: f64 = added.iter().map(|card| card.price).sum();
            debug!("items subtotal {:.2} after {} items", subtotal, added.len());
            if subtotal >= threshold {
                self.goto_cart(page).await?;
                let total = self.reader.read_total(page).await?;
                return Ok((added, total));
            }
        }
        Err(E2eError::Precondition(format!(
            "items subtotal stayed below {threshold:.2} after {max_items} items"
        )))
    }
}

/// Product id of a direct add: the id attribute, else the link's `add-to-cart` parameter
pub fn product_id(action: &PurchaseAction) -> Option<String> {
    let PurchaseAction::AddToCart { product_id, href } = action else {
        return None;
    };
    product_id
        .clone()
        .or_else(|| href.as_deref().and_then(add_to_cart_param))
}

fn add_to_cart_param(href: &str) -> Option<String> {
    let base = Url::parse("http://storefront.invalid/").ok()?;
    let url = base.join(href).ok()?;
    let id = url
        .query_pairs()
        .find(|(key, _)| key == "add-to-cart")
        .map(|(_, value)| value.into_owned());
    id.filter(|id| !id.is_empty())
}

/// First name not found, case-insensitively, in the concatenated cart text
fn first_missing<'a, S: AsRef<str>>(
    observed: &[&str],
    names: &'a [S],
) -> E2eResult<Option<&'a str>> {
    let text = observed.join(" ");
    for name in names {
        let name = name.as_ref();
        let pattern = RegexBuilder::new(&regex::escape(name))
            .case_insensitive(true)
            .build()
            .map_err(|e| E2eError::Parse(format!("cart name pattern {name:?}: {e}")))?;
        if !pattern.is_match(&text) {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

fn with_query(path: &str, key: &str, value: &str) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}{key}={value}")
}
