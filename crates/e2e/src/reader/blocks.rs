//! Component-rendered (blocks) storefront markup

use async_trait::async_trait;

use shopcheck_common::{CartLine, ProductCard, RenderMode, ShippingOption};

use super::{
    cards_at, cart_lines_at, first_text, total_in, Affordances, CardMarkup, CartMarkup,
    ShippingSnapshot, StateSource, TotalsMarkup, TotalsScope,
};
use crate::error::E2eResult;
use crate::page::Page;

const MARKERS: &[&str] = &[
    ".wp-block-woocommerce-cart",
    ".wc-block-cart",
    ".wp-block-woocommerce-checkout",
    ".wc-block-checkout",
    ".wc-block-grid",
    ".wc-block-product-template",
];

const CART_MARKERS: &[&str] = &[".wp-block-woocommerce-cart", ".wc-block-cart"];

const CARDS: CardMarkup = CardMarkup {
    entries: [
        ".wc-block-product-template .wc-block-product",
        ".wc-block-grid__product, .wp-block-post.product",
    ],
    name: &[
        ".wc-block-grid__product-title",
        ".wp-block-post-title",
        ".wc-block-components-product-name",
        "h3",
        "h2",
    ],
    sale_price: &[
        ".wc-block-grid__product-price ins",
        ".wc-block-components-product-price ins",
        ".wc-block-components-product-price__value.is-discounted",
    ],
    price: &[
        ".wc-block-grid__product-price .woocommerce-Price-amount",
        ".wc-block-components-product-price .woocommerce-Price-amount",
        ".wc-block-grid__product-price",
        ".wc-block-components-product-price",
        ".price",
    ],
    sale_badge: &[
        ".wc-block-grid__product-onsale",
        ".wc-block-components-product-sale-badge",
        ".onsale",
    ],
    add_button: &[
        ".wp-block-button__link.add_to_cart_button",
        "button.add_to_cart_button",
        "a.add_to_cart_button",
        ".wc-block-components-product-button__button",
    ],
    detail_link: &[".wc-block-grid__product-link", ".wp-block-post-title a", "a[href]"],
};

const CART: CartMarkup = CartMarkup {
    rows: ".wc-block-cart-items .wc-block-cart-items__row",
    name: &[".wc-block-components-product-name"],
};

const TOTALS: TotalsMarkup = TotalsMarkup {
    rows: ".wc-block-components-totals-item",
    label: ".wc-block-components-totals-item__label",
    value: ".wc-block-components-totals-item__value",
};

const SHIPPING_METHODS: &str =
    ".wc-block-components-shipping-rates-control .wc-block-components-radio-control__option";
const SHIPPING_SUMMARY: &str =
    ".wc-block-components-totals-shipping, .wp-block-woocommerce-checkout-order-summary-shipping-block";

static AFFORDANCES: Affordances = Affordances {
    remove_line: ".wc-block-cart-item__remove-link",
    proceed_to_checkout: ".wc-block-cart__submit-button, .wc-block-cart__submit a",
    checkout_form: ".wc-block-checkout, .wp-block-woocommerce-checkout",
    place_order: ".wc-block-components-checkout-place-order-button",
    payment_options: "#payment-method .wc-block-components-radio-control__option, .wc-block-checkout__payment-method label",
    view_cart: ".wc-block-components-product-button__view-cart, a.added_to_cart",
    add_to_cart_submit: ".wc-block-add-to-cart-form button[type=submit], form.cart button.single_add_to_cart_button",
    option_selects: ".wc-block-add-to-cart-form select, form.variations_form select",
};

/// Blocks (cart/checkout/product-collection block) markup
#[derive(Debug, Default, Clone, Copy)]
pub struct BlocksSource;

#[async_trait]
impl StateSource for BlocksSource {
    fn mode(&self) -> RenderMode {
        RenderMode::Blocks
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
            TotalsScope::Cart => &[
                ".wp-block-woocommerce-cart-totals-block",
                ".wc-block-cart__totals",
                ".wc-block-components-totals-wrapper",
            ],
            TotalsScope::Checkout => &[
                ".wc-block-checkout__sidebar",
                ".wp-block-woocommerce-checkout-order-summary-block",
            ],
        }
    }

    fn recalculation_indicator(&self) -> &'static str {
        ".wc-block-components-loading-mask, .wc-block-components-spinner"
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
        for option in page.query(SHIPPING_METHODS).await? {
            let value = option
                .find_first("input[type=radio], input")?
                .and_then(|input| input.attr("value").map(str::to_string));
            let label = first_text(&option, &[".wc-block-components-radio-control__label"])?
                .unwrap_or_else(|| option.text.clone());
            snapshot.options.push(ShippingOption { label, value });
        }
        snapshot.summary = page
            .query(SHIPPING_SUMMARY)
            .await?
            .into_iter()
            .map(|el| el.text)
            .filter(|text| !text.is_empty())
            .collect();
        Ok(snapshot)
    }
}
