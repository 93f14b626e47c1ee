//! In-process storefront for flow tests
//!
//! Renders listing, cart, checkout, product and confirmation pages in either
//! markup and reacts to clicks, fills and option selection the way the real
//! storefront does. Controls carry a `data-mock` attribute naming their effect.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use shopcheck_common::{
    filter_free_shipping, CartItem, FreeShippingRule, PathsConfig, RenderMode, RunConfig,
    TimingConfig,
};
use shopcheck_e2e::html;
use shopcheck_e2e::{E2eError, E2eResult, Element, FlowSequencer, Page, PageStateReader, Polls};

const ORIGIN: &str = "http://shop.test";
const FLAT_RATE: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    pub slug: &'static str,
    pub price: f64,
    pub sale_price: Option<f64>,
    /// Option values of a variable product with their enabled flag
    pub options: Option<Vec<(&'static str, bool)>>,
}

impl Product {
    pub fn simple(id: u32, name: &'static str, slug: &'static str, price: f64) -> Self {
        Self {
            id,
            name,
            slug,
            price,
            sale_price: None,
            options: None,
        }
    }

    pub fn on_sale(mut self, sale_price: f64) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    pub fn variable(mut self, options: Vec<(&'static str, bool)>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn effective_price(&self) -> f64 {
        self.sale_price.unwrap_or(self.price)
    }
}

/// Wallet 70, boots 48, a discounted scarf and a hoodie with sizes
pub fn catalog() -> Vec<Product> {
    vec![
        Product::simple(12, "Leather Wallet", "leather-wallet", 70.0),
        Product::simple(13, "Ankle Boots", "ankle-boots", 48.0),
        Product::simple(14, "Wool Scarf", "wool-scarf", 25.0).on_sale(20.0),
        Product::simple(30, "Hoodie", "hoodie", 45.0).variable(vec![("s", false), ("m", true), ("l", true)]),
    ]
}

#[derive(Debug, Default)]
struct State {
    path: String,
    query: Vec<(String, String)>,
    cart: Vec<u32>,
    fields: BTreeMap<String, String>,
    selected: BTreeMap<String, String>,
    payment: Option<String>,
    orders: u32,
    notice: Option<String>,
    /// Renders left with the recalculation overlay shown
    recalculating: usize,
}

/// Knobs for storefront misbehaviour
#[derive(Debug, Clone, Default)]
pub struct Quirks {
    /// The listing path renders no entries; the home page does
    pub listing_on_home_only: bool,
    /// One removal drops every line
    pub remove_clears_cart: bool,
    /// Renders the recalculation overlay after every cart change
    pub recalc_renders: usize,
    /// No shipping UI at all
    pub hide_shipping: bool,
}

pub struct MockStorefront {
    mode: RenderMode,
    products: Vec<Product>,
    quirks: Quirks,
    rule: FreeShippingRule,
    state: Mutex<State>,
}

impl MockStorefront {
    pub fn new(mode: RenderMode) -> Self {
        Self::with_catalog(mode, catalog())
    }

    pub fn with_catalog(mode: RenderMode, products: Vec<Product>) -> Self {
        Self {
            mode,
            products,
            quirks: Quirks::default(),
            rule: FreeShippingRule::default(),
            state: Mutex::new(State {
                path: "/".to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn cart_names(&self) -> Vec<&'static str> {
        let state = self.state.lock();
        state
            .cart
            .iter()
            .filter_map(|id| self.product(*id))
            .map(|p| p.name)
            .collect()
    }

    pub fn put_in_cart(&self, ids: &[u32]) {
        self.state.lock().cart.extend_from_slice(ids);
    }

    pub fn orders(&self) -> u32 {
        self.state.lock().orders
    }

    pub fn field(&self, id: &str) -> Option<String> {
        self.state.lock().fields.get(id).cloned()
    }

    pub fn payment(&self) -> Option<String> {
        self.state.lock().payment.clone()
    }

    fn product(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn cart_items(&self, state: &State) -> Vec<CartItem> {
        state
            .cart
            .iter()
            .filter_map(|id| self.product(*id))
            .map(|p| CartItem {
                name: p.name.to_string(),
                price: p.effective_price(),
                on_sale: p.sale_price.is_some(),
            })
            .collect()
    }

    fn subtotal(&self, state: &State) -> f64 {
        self.cart_items(state).iter().map(|i| i.price).sum()
    }

    fn free_shipping(&self, state: &State) -> bool {
        let items = self.cart_items(state);
        let eligible = self.rule.is_eligible(self.subtotal(state));
        filter_free_shipping(eligible, &items)
    }

    fn total(&self, state: &State) -> f64 {
        let shipping = if self.free_shipping(state) || self.quirks.hide_shipping {
            0.0
        } else {
            FLAT_RATE
        };
        self.subtotal(state) + shipping
    }

    fn cart_changed(&self, state: &mut State) {
        state.recalculating = self.quirks.recalc_renders;
    }

    fn navigate(&self, state: &mut State, url: &str) -> E2eResult<()> {
        let base = Url::parse(ORIGIN).map_err(|e| E2eError::Config(e.to_string()))?;
        let target = base
            .join(url)
            .map_err(|e| E2eError::Config(format!("{url}: {e}")))?;
        state.path = target.path().to_string();
        state.query = target
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        state.notice = None;

        let add = state
            .query
            .iter()
            .find(|(k, _)| k == "add-to-cart")
            .and_then(|(_, v)| v.parse::<u32>().ok());
        if let Some(id) = add {
            if self.product(id).map(|p| p.options.is_none()).unwrap_or(false) {
                state.cart.push(id);
                self.cart_changed(state);
            }
        }

        // Checkout with an empty cart goes back to the cart
        if state.path == "/checkout/" && state.cart.is_empty() {
            state.path = "/cart/".to_string();
        }
        Ok(())
    }

    fn render(&self, state: &mut State) -> String {
        let body = match state.path.as_str() {
            "/shop/" if !self.quirks.listing_on_home_only => self.render_listing(),
            "/" if state.query.iter().any(|(k, v)| k == "page_id" && v == "cart") => self.render_cart(state),
            "/" if self.quirks.listing_on_home_only => self.render_listing(),
            "/" => "<h1>Welcome</h1>".to_string(),
            "/cart/" => self.render_cart(state),
            "/checkout/" => self.render_checkout(state),
            path if path.starts_with("/checkout/order-received/") => {
                "<p class=\"woocommerce-notice\">Thank you. Your order has been received.</p>".to_string()
            }
            path if path.starts_with("/product/") => self.render_product(state, path),
            _ => "<h1>Page not found</h1>".to_string(),
        };
        let overlay = if state.recalculating > 0 {
            state.recalculating -= 1;
            match self.mode {
                RenderMode::Classic => "<div class=\"blockUI blockOverlay\"></div>",
                RenderMode::Blocks => "<div class=\"wc-block-components-loading-mask\"></div>",
            }
        } else {
            ""
        };
        let notice = state
            .notice
            .as_deref()
            .map(|n| format!("<div class=\"woocommerce-error\">{n}</div>"))
            .unwrap_or_default();
        format!("<html><body>{notice}{body}{overlay}</body></html>")
    }

    fn render_listing(&self) -> String {
        match self.mode {
            RenderMode::Classic => {
                let items: String = self.products.iter().map(classic_card).collect();
                format!("<ul class=\"products columns-4\">{items}</ul>")
            }
            RenderMode::Blocks => {
                let items: String = self.products.iter().map(blocks_card).collect();
                format!(
                    "<div class=\"wp-block-woocommerce-product-collection\"><ul class=\"wc-block-product-template\">{items}</ul></div>"
                )
            }
        }
    }

    fn shipping_options(&self, state: &State) -> Vec<(&'static str, String)> {
        if self.quirks.hide_shipping {
            return vec![];
        }
        let mut options = vec![("flat_rate:1", format!("Flat rate: {}", eur(FLAT_RATE)))];
        if self.free_shipping(state) {
            options.insert(0, ("free_shipping:2", "Free shipping".to_string()));
        }
        options
    }

    fn render_cart(&self, state: &State) -> String {
        match self.mode {
            RenderMode::Classic => self.classic_cart(state),
            RenderMode::Blocks => self.blocks_cart(state),
        }
    }

    fn classic_cart(&self, state: &State) -> String {
        if state.cart.is_empty() {
            return "<div class=\"woocommerce\"><p class=\"cart-empty woocommerce-info\">Your cart is currently empty.</p></div>".to_string();
        }
        let rows: String = state
            .cart
            .iter()
            .enumerate()
            .filter_map(|(line, id)| self.product(*id).map(|p| (line, p)))
            .map(|(line, p)| {
                format!(
                    "<tr class=\"woocommerce-cart-form__cart-item cart_item\">\
                     <td class=\"product-remove\"><a href=\"#\" class=\"remove\" data-mock=\"remove:{line}\">×</a></td>\
                     <td class=\"product-name\"><a href=\"/product/{}/\">{}</a></td>\
                     <td class=\"product-price\">{}</td></tr>",
                    p.slug,
                    p.name,
                    eur(p.effective_price())
                )
            })
            .collect();
        let shipping = if self.quirks.hide_shipping {
            String::new()
        } else {
            let methods: String = self
                .shipping_options(state)
                .iter()
                .map(|(value, label)| {
                    format!(
                        "<li><input type=\"radio\" name=\"shipping_method[0]\" value=\"{value}\" class=\"shipping_method\"><label>{label}</label></li>"
                    )
                })
                .collect();
            format!(
                "<tr class=\"woocommerce-shipping-totals shipping\"><th>Shipping</th><td>\
                 <ul id=\"shipping_method\" class=\"woocommerce-shipping-methods\">{methods}</ul></td></tr>"
            )
        };
        format!(
            "<div class=\"woocommerce\">\
             <form class=\"woocommerce-cart-form\"><table class=\"shop_table cart\"><tbody>{rows}</tbody></table></form>\
             <div class=\"cart-collaterals\"><div class=\"cart_totals\"><table class=\"shop_table\"><tbody>\
             <tr class=\"cart-subtotal\"><th>Subtotal</th><td>{}</td></tr>{shipping}\
             <tr class=\"order-total\"><th>Total</th><td><strong>{}</strong></td></tr>\
             </tbody></table>\
             <div class=\"wc-proceed-to-checkout\"><a href=\"/checkout/\" class=\"checkout-button button alt wc-forward\">Proceed to checkout</a></div>\
             </div></div></div>",
            eur(self.subtotal(state)),
            eur(self.total(state))
        )
    }

    fn blocks_totals(&self, state: &State, with_rates: bool) -> String {
        let rates = if with_rates && !self.quirks.hide_shipping {
            let options: String = self
                .shipping_options(state)
                .iter()
                .map(|(value, label)| {
                    format!(
                        "<label class=\"wc-block-components-radio-control__option\">\
                         <input type=\"radio\" value=\"{value}\">\
                         <span class=\"wc-block-components-radio-control__label\">{label}</span></label>"
                    )
                })
                .collect();
            format!("<div class=\"wc-block-components-shipping-rates-control\">{options}</div>")
        } else {
            String::new()
        };
        format!(
            "<div class=\"wc-block-components-totals-item\">\
             <span class=\"wc-block-components-totals-item__label\">Subtotal</span>\
             <span class=\"wc-block-components-totals-item__value\">{}</span></div>\
             {rates}\
             <div class=\"wc-block-components-totals-item wc-block-components-totals-footer-item\">\
             <span class=\"wc-block-components-totals-item__label\">Total</span>\
             <span class=\"wc-block-components-totals-item__value\">{}</span></div>",
            eur(self.subtotal(state)),
            eur(self.total(state))
        )
    }

    fn blocks_cart(&self, state: &State) -> String {
        if state.cart.is_empty() {
            return "<div class=\"wp-block-woocommerce-cart wc-block-cart\"><h2>Your cart is currently empty!</h2></div>".to_string();
        }
        let rows: String = state
            .cart
            .iter()
            .enumerate()
            .filter_map(|(line, id)| self.product(*id).map(|p| (line, p)))
            .map(|(line, p)| {
                format!(
                    "<tr class=\"wc-block-cart-items__row\"><td>\
                     <a class=\"wc-block-components-product-name\" href=\"/product/{}/\">{}</a>\
                     <button class=\"wc-block-cart-item__remove-link\" data-mock=\"remove:{line}\">Remove item</button>\
                     </td><td>{}</td></tr>",
                    p.slug,
                    p.name,
                    eur(p.effective_price())
                )
            })
            .collect();
        format!(
            "<div class=\"wp-block-woocommerce-cart wc-block-cart\">\
             <table class=\"wc-block-cart-items\"><tbody>{rows}</tbody></table>\
             <div class=\"wp-block-woocommerce-cart-totals-block wc-block-cart__totals\">{}</div>\
             <a class=\"wc-block-cart__submit-button\" href=\"/checkout/\">Proceed to Checkout</a></div>",
            self.blocks_totals(state, true)
        )
    }

    fn render_checkout(&self, state: &State) -> String {
        match self.mode {
            RenderMode::Classic => format!(
                "<form name=\"checkout\" class=\"checkout woocommerce-checkout\">\
                 <input id=\"billing_first_name\"><input id=\"billing_last_name\">\
                 <input id=\"billing_address_1\"><input id=\"billing_city\">\
                 <input id=\"billing_postcode\"><input id=\"billing_phone\"><input id=\"billing_email\">\
                 <div id=\"order_review\"><table class=\"shop_table woocommerce-checkout-review-order-table\"><tbody>\
                 <tr class=\"cart-subtotal\"><th>Subtotal</th><td>{}</td></tr>\
                 <tr class=\"order-total\"><th>Total</th><td><strong>{}</strong></td></tr></tbody></table>\
                 <div id=\"payment\"><ul class=\"wc_payment_methods payment_methods methods\">\
                 <li class=\"wc_payment_method payment_method_bacs\"><input id=\"payment_method_bacs\" type=\"radio\" value=\"bacs\" data-mock=\"pay:bacs\"><label data-mock=\"pay:bacs\">Direct bank transfer</label></li>\
                 <li class=\"wc_payment_method payment_method_cod\"><input id=\"payment_method_cod\" type=\"radio\" value=\"cod\" data-mock=\"pay:cod\"><label data-mock=\"pay:cod\">Cash on delivery</label></li>\
                 </ul><button type=\"submit\" id=\"place_order\" data-mock=\"place-order\">Place order</button></div></div></form>",
                eur(self.subtotal(state)),
                eur(self.total(state))
            ),
            RenderMode::Blocks => format!(
                "<div class=\"wp-block-woocommerce-checkout wc-block-checkout\">\
                 <input id=\"email\" type=\"email\">\
                 <input id=\"shipping-first_name\"><input id=\"shipping-last_name\">\
                 <input id=\"shipping-address_1\"><input id=\"shipping-city\">\
                 <input id=\"shipping-postcode\"><input id=\"shipping-phone\">\
                 <div id=\"payment-method\">\
                 <label class=\"wc-block-components-radio-control__option\" data-mock=\"pay:bacs\"><input type=\"radio\" value=\"bacs\">Direct bank transfer</label>\
                 <label class=\"wc-block-components-radio-control__option\" data-mock=\"pay:cod\"><input type=\"radio\" value=\"cod\">Cash on delivery</label>\
                 </div>\
                 <button class=\"wc-block-components-checkout-place-order-button\" data-mock=\"place-order\">Place Order</button>\
                 <div class=\"wc-block-checkout__sidebar\">{}</div></div>",
                self.blocks_totals(state, false)
            ),
        }
    }

    fn render_product(&self, state: &State, path: &str) -> String {
        let slug = path.trim_start_matches("/product/").trim_end_matches('/');
        let Some(product) = self.products.iter().find(|p| p.slug == slug) else {
            return "<h1>Page not found</h1>".to_string();
        };
        let message = match state.query.iter().any(|(k, _)| k == "added") {
            true => format!(
                "<div class=\"woocommerce-message\"><a href=\"/cart/\" class=\"button wc-forward\">View cart</a> “{}” has been added to your cart.</div>",
                product.name
            ),
            false => String::new(),
        };
        let options = match &product.options {
            Some(values) => {
                let opts: String = values
                    .iter()
                    .map(|(value, enabled)| {
                        let disabled = if *enabled { "" } else { " disabled" };
                        format!("<option value=\"{value}\"{disabled}>{}</option>", value.to_uppercase())
                    })
                    .collect();
                format!(
                    "<table class=\"variations\"><tbody><tr><td>\
                     <select id=\"pa_size\" name=\"attribute_pa_size\"><option value=\"\">Choose an option</option>{opts}</select>\
                     </td></tr></tbody></table>"
                )
            }
            None => String::new(),
        };
        format!(
            "{message}<h1 class=\"product_title\">{}</h1><p class=\"price\">{}</p>\
             <form class=\"variations_form cart\">{options}\
             <button type=\"submit\" class=\"single_add_to_cart_button button alt\" data-mock=\"add-single:{}\">Add to cart</button></form>",
            product.name,
            eur(product.effective_price()),
            product.id
        )
    }

    fn resolve(&self, state: &mut State, selector: &str, index: usize) -> E2eResult<Element> {
        let doc = self.render(state);
        html::select(&doc, selector)?
            .into_iter()
            .nth(index)
            .ok_or_else(|| E2eError::NotFound(format!("{selector} #{index} on {}", state.path)))
    }

    fn act(&self, state: &mut State, effect: &str) -> E2eResult<()> {
        let (verb, arg) = effect.split_once(':').unwrap_or((effect, ""));
        match verb {
            "remove" => {
                let line: usize = arg.parse().map_err(|_| E2eError::Parse(effect.to_string()))?;
                if self.quirks.remove_clears_cart {
                    state.cart.clear();
                } else if line < state.cart.len() {
                    state.cart.remove(line);
                }
                self.cart_changed(state);
            }
            "add-single" => {
                let id: u32 = arg.parse().map_err(|_| E2eError::Parse(effect.to_string()))?;
                let needs_option = self.product(id).map(|p| p.options.is_some()).unwrap_or(false);
                if needs_option && !state.selected.contains_key("pa_size") {
                    state.notice = Some("Please choose product options".to_string());
                    return Ok(());
                }
                state.cart.push(id);
                self.cart_changed(state);
                let path = state.path.clone();
                self.navigate(state, &format!("{path}?added=1"))?;
            }
            "pay" => state.payment = Some(arg.to_string()),
            "place-order" => {
                let email = state.fields.get("billing_email").or_else(|| state.fields.get("email"));
                if state.cart.is_empty() || email.map(|e| e.is_empty()).unwrap_or(true) {
                    state.notice = Some("Billing email is required".to_string());
                    return Ok(());
                }
                state.orders += 1;
                state.cart.clear();
                let url = format!("/checkout/order-received/{}/?key=wc_order_test", 100 + state.orders);
                self.navigate(state, &url)?;
            }
            other => return Err(E2eError::Unsupported(format!("mock effect {other}"))),
        }
        Ok(())
    }
}

#[async_trait]
impl Page for MockStorefront {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        self.navigate(&mut state, url)
    }

    async fn current_url(&self) -> E2eResult<String> {
        let state = self.state.lock();
        let query: Vec<String> = state.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        Ok(match query.is_empty() {
            true => format!("{ORIGIN}{}", state.path),
            false => format!("{ORIGIN}{}?{}", state.path, query.join("&")),
        })
    }

    async fn query(&self, selector: &str) -> E2eResult<Vec<Element>> {
        let mut state = self.state.lock();
        let doc = self.render(&mut state);
        html::select(&doc, selector)
    }

    async fn click(&self, selector: &str, index: usize) -> E2eResult<()> {
        let mut state = self.state.lock();
        let el = self.resolve(&mut state, selector, index)?;
        if let Some(effect) = el.attr("data-mock") {
            return self.act(&mut state, effect);
        }
        match el.attr("href") {
            Some(href) if href != "#" => self.navigate(&mut state, href),
            _ => Ok(()),
        }
    }

    async fn fill(&self, selector: &str, index: usize, value: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        let el = self.resolve(&mut state, selector, index)?;
        let id = el.attr("id").unwrap_or(selector).to_string();
        state.fields.insert(id, value.to_string());
        Ok(())
    }

    async fn select_option(&self, selector: &str, index: usize, value: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        let el = self.resolve(&mut state, selector, index)?;
        let id = el.attr("id").unwrap_or(selector).to_string();
        state.selected.insert(id, value.to_string());
        Ok(())
    }

    async fn wait_for_load(&self) -> E2eResult<()> {
        Ok(())
    }
}

/// `€1.234,56` style amounts
pub fn eur(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (int, frac) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let mut grouped = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("<span class=\"woocommerce-Price-amount amount\"><bdi><span class=\"woocommerce-Price-currencySymbol\">€</span>{grouped},{frac}</bdi></span>")
}

fn classic_card(p: &Product) -> String {
    let price = match p.sale_price {
        Some(sale) => format!("<del>{}</del> <ins>{}</ins>", eur(p.price), eur(sale)),
        None => eur(p.price),
    };
    let badge = match p.sale_price {
        Some(_) => "<span class=\"onsale\">Sale!</span>",
        None => "",
    };
    let button = match p.options {
        Some(_) => format!(
            "<a href=\"/product/{}/\" data-product_id=\"{}\" class=\"button product_type_variable add_to_cart_button\">Select options</a>",
            p.slug, p.id
        ),
        None => format!(
            "<a href=\"?add-to-cart={id}\" data-product_id=\"{id}\" class=\"button product_type_simple add_to_cart_button ajax_add_to_cart\">Add to cart</a>",
            id = p.id
        ),
    };
    format!(
        "<li class=\"product type-product\"><a href=\"/product/{}/\" class=\"woocommerce-LoopProduct-link woocommerce-loop-product__link\">\
         {badge}<h2 class=\"woocommerce-loop-product__title\">{}</h2><span class=\"price\">{price}</span></a>{button}</li>",
        p.slug, p.name
    )
}

fn blocks_card(p: &Product) -> String {
    let price = match p.sale_price {
        Some(sale) => format!("<del>{}</del> <ins>{}</ins>", eur(p.price), eur(sale)),
        None => eur(p.price),
    };
    let badge = match p.sale_price {
        Some(_) => "<div class=\"wc-block-components-product-sale-badge\">Sale</div>",
        None => "",
    };
    let button = match p.options {
        Some(_) => format!(
            "<a href=\"/product/{}/\" class=\"wp-block-button__link wc-block-components-product-button__button add_to_cart_button\">Select options</a>",
            p.slug
        ),
        None => format!(
            "<button class=\"wp-block-button__link wc-block-components-product-button__button add_to_cart_button\" data-product_id=\"{}\">Add to cart</button>",
            p.id
        ),
    };
    format!(
        "<li class=\"wc-block-product\">{badge}\
         <h3 class=\"wp-block-post-title\"><a href=\"/product/{}/\">{}</a></h3>\
         <div class=\"wc-block-components-product-price\">{price}</div>{button}</li>",
        p.slug, p.name
    )
}

/// Run configuration with millisecond polling
pub fn fast_config() -> RunConfig {
    RunConfig {
        base_url: ORIGIN.to_string(),
        timing: TimingConfig {
            operation_timeout_ms: 5_000,
            poll_interval_ms: 1,
            cart_poll_attempts: 3,
            attach_attempts: 3,
            settle_attempts: 10,
            retries: 2,
            removal_attempts: 10,
        },
        ..Default::default()
    }
}

pub fn flows() -> FlowSequencer {
    FlowSequencer::from_config(&fast_config())
}

pub fn flows_with_paths(paths: PathsConfig) -> FlowSequencer {
    let config = fast_config();
    FlowSequencer::new(
        PageStateReader::new(Polls::from(&config.timing)),
        paths,
        config.checkout,
        config.confirmation_phrases,
    )
}

pub fn short(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
