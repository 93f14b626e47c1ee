//! Template-rendered storefront markup

use async_trait::async_trait;

use shopcheck_common::{CartLine, ProductCard, RenderMode, ShippingOption};

use super::{
    cards_at, cart_lines_at, first_text, total_in, Affordances, CardMarkup, CartMarkup,
    ShippingSnapshot, StateSource, TotalsMarkup, TotalsScope,
};
use crate::error::E2eResult;
use crate::page::Page;

const MARKERS: &[&str] = &[
    "form.woocommerce-cart-form",
    "form.woocommerce-checkout",
    ".cart_totals",
    "ul.products",
    ".cart-empty",
];

const CART_MARKERS: &[&str] = &["form.woocommerce-cart-form", ".cart_totals", ".cart-empty"];

const CARDS: CardMarkup = CardMarkup {
    entries: ["ul.products li.product", ".products .product"],
    name: &[
        ".woocommerce-loop-product__title",
        "h2",
        "h3",
        ".product-title",
        "a.woocommerce-LoopProduct-link",
    ],
    sale_price: &[".price ins .woocommerce-Price-amount", ".price ins"],
    price: &[".price .woocommerce-Price-amount", ".price .amount", ".price"],
    sale_badge: &[".onsale"],
    add_button: &["a.add_to_cart_button", "button.add_to_cart_button", "a.button"],
    detail_link: &["a.woocommerce-LoopProduct-link", "a.woocommerce-loop-product__link", "a[href]"],
};

const CART: CartMarkup = CartMarkup {
    rows: "form.woocommerce-cart-form tr.cart_item, table.shop_table.cart tr.cart_item",
    name: &["td.product-name a", "td.product-name"],
};

const TOTALS: TotalsMarkup = TotalsMarkup {
    rows: "tr",
    label: "th",
    value: "td",
};

const SHIPPING_METHODS: &str = "#shipping_method li, ul.woocommerce-shipping-methods li";
const SHIPPING_SUMMARY: &str = "tr.woocommerce-shipping-totals td, tr.shipping td";

static AFFORDANCES: Affordances = Affordances {
    remove_line: "td.product-remove a.remove, .woocommerce-cart-form a.remove",
    proceed_to_checkout: ".wc-proceed-to-checkout a.checkout-button, a.checkout-button",
    checkout_form: "form.checkout, form.woocommerce-checkout",
    place_order: "#place_order",
    payment_options: "#payment li.wc_payment_method label, ul.wc_payment_methods label",
    view_cart: ".woocommerce-message a.wc-forward, a.added_to_cart",
    add_to_cart_submit: "form.cart button.single_add_to_cart_button, form.cart button[type=submit]",
    option_selects: "form.variations_form select, table.variations select",
};

/// Classic (shortcode/template) markup
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicSource;

#[async_trait]
impl StateSource for ClassicSource {
    fn mode(&self) -> RenderMode {
        RenderMode::Classic
    }

    fn markers(&self) -> &'static [&'static str] {
        MARKERS
    }

    fn cart_markers(&self) -> &'static [&'static str] {
        CART_MARKERS
    }

    fn affordances(&self) -> &'static Affordances {
        &AFFORDANCES
    }

    fn totals_containers(&self, scope: TotalsScope) -> &'static [&'static str] {
        match scope {
            TotalsScope::Cart => &[".cart_totals"],
            TotalsScope::Checkout => &["#order_review", ".woocommerce-checkout-review-order-table"],
        }
    }

    fn recalculation_indicator(&self) -> &'static str {
        ".blockUI.blockOverlay"
    }

    async fn list_products(&self, page: &dyn Page) -> E2eResult<Vec<ProductCard>> {
        cards_at(page, &CARDS).await
    }

    async fn list_cart_lines(&self, page: &dyn Page) -> E2eResult<Vec<CartLine>> {
        cart_lines_at(page, &CART).await
    }

    async fn read_total(&self, page: &dyn Page, scope: TotalsScope) -> E2eResult<Option<f64>> {
        total_in(page, self.totals_containers(scope), &TOTALS).await
    }

    async fn read_shipping_options(&self, page: &dyn Page) -> E2eResult<ShippingSnapshot> {
        let mut snapshot = ShippingSnapshot::default();
        for method in page.query(SHIPPING_METHODS).await? {
            let value = method
                .find_first("input.shipping_method, input")?
                .and_then(|input| input.attr("value").map(str::to_string));
            let label = first_text(&method, &["label"])?.unwrap_or_else(|| method.text.clone());
            snapshot.options.push(ShippingOption { label, value });
        }
        if snapshot.options.is_empty() {
            snapshot.summary = page
                .query(SHIPPING_SUMMARY)
                .await?
                .into_iter()
                .map(|cell| cell.text)
                .filter(|text| !text.is_empty())
                .collect();
        }
        Ok(snapshot)
    }
}
