//! Reader behaviour over saved storefront pages

use std::time::Duration;

use shopcheck_common::{PurchaseAction, RenderMode};
use shopcheck_e2e::{E2eError, PageStateReader, Poll, Polls, SnapshotPage};

const CLASSIC_SHOP: &str = r#"
<html><body class="woocommerce-shop">
<ul class="products columns-3">
  <li class="product type-product">
    <a href="/product/wallet/" class="woocommerce-LoopProduct-link">
      <h2 class="woocommerce-loop-product__title">Leather Wallet</h2>
      <span class="price"><span class="woocommerce-Price-amount amount"><bdi><span class="woocommerce-Price-currencySymbol">€</span>70.00</bdi></span></span>
    </a>
    <a href="?add-to-cart=12" data-product_id="12" class="button product_type_simple add_to_cart_button ajax_add_to_cart">Add to cart</a>
  </li>
  <li class="product type-product sale">
    <a href="/product/scarf/" class="woocommerce-LoopProduct-link">
      <span class="onsale">Sale!</span>
      <h2 class="woocommerce-loop-product__title">Wool Scarf</h2>
      <span class="price"><del><span class="woocommerce-Price-amount amount">€25.00</span></del> <ins><span class="woocommerce-Price-amount amount">€20.00</span></ins></span>
    </a>
    <a href="?add-to-cart=14" data-product_id="14" class="button product_type_simple add_to_cart_button ajax_add_to_cart">Add to cart</a>
  </li>
  <li class="product type-product">
    <a href="/product/hoodie/" class="woocommerce-LoopProduct-link">
      <h2 class="woocommerce-loop-product__title">Hoodie</h2>
      <span class="price"><span class="woocommerce-Price-amount amount">€45.00</span></span>
    </a>
    <a href="/product/hoodie/" data-product_id="30" class="button product_type_variable">Select options</a>
  </li>
</ul>
</body></html>
"#;

const CLASSIC_CART: &str = r#"
<html><body>
<form class="woocommerce-cart-form" action="/cart/" method="post">
  <table class="shop_table cart">
    <tr class="cart_item">
      <td class="product-remove"><a href="/cart/?remove_item=a1" class="remove">×</a></td>
      <td class="product-name"><a href="/product/wallet/">Leather Wallet</a></td>
      <td class="product-price"><span class="woocommerce-Price-amount amount">€70.00</span></td>
    </tr>
  </table>
</form>
<div class="cart_totals">
  <h2>Cart totals</h2>
  <table class="shop_table">
    <tr class="cart-subtotal"><th>Subtotal</th><td><span class="woocommerce-Price-amount amount">€70.00</span></td></tr>
    <tr class="woocommerce-shipping-totals shipping">
      <th>Shipping</th>
      <td>
        <ul id="shipping_method" class="woocommerce-shipping-methods">
          <li><input type="hidden" name="shipping_method[0]" value="flat_rate:1" class="shipping_method"><label>Flat rate: <span class="woocommerce-Price-amount amount">€5.00</span></label></li>
        </ul>
      </td>
    </tr>
    <tr class="order-total"><th>Total</th><td><strong><span class="woocommerce-Price-amount amount">€75.00</span></strong></td></tr>
  </table>
</div>
</body></html>
"#;

const BLOCKS_CART: &str = r#"
<html><body>
<div class="wp-block-woocommerce-cart wc-block-cart">
  <table class="wc-block-cart-items">
    <tbody>
      <tr class="wc-block-cart-items__row">
        <td><a class="wc-block-components-product-name" href="/product/wallet/">Leather Wallet</a></td>
      </tr>
      <tr class="wc-block-cart-items__row">
        <td><a class="wc-block-components-product-name" href="/product/boots/">Ankle Boots</a></td>
      </tr>
    </tbody>
  </table>
  <div class="wp-block-woocommerce-cart-totals-block">
    <div class="wc-block-components-totals-wrapper">
      <div class="wc-block-components-totals-item">
        <span class="wc-block-components-totals-item__label">Subtotal</span>
        <span class="wc-block-components-totals-item__value">€118.00</span>
      </div>
    </div>
    <div class="wc-block-components-totals-wrapper">
      <div class="wc-block-components-shipping-rates-control">
        <label class="wc-block-components-radio-control__option">
          <input type="radio" value="free_shipping:2" checked>
          <span class="wc-block-components-radio-control__label">Free shipping</span>
        </label>
        <label class="wc-block-components-radio-control__option">
          <input type="radio" value="flat_rate:1">
          <span class="wc-block-components-radio-control__label">Flat rate</span>
          <span class="wc-block-components-radio-control__secondary-label">€5.00</span>
        </label>
      </div>
    </div>
    <div class="wc-block-components-totals-wrapper">
      <div class="wc-block-components-totals-item wc-block-components-totals-footer-item">
        <span class="wc-block-components-totals-item__label">Estimated total</span>
        <div class="wc-block-components-totals-item__value">€118.00</div>
      </div>
    </div>
  </div>
</div>
</body></html>
"#;

const BARE_TOTAL: &str = r#"
<html><body>
<table><tr class="order-total"><th>Total</th><td>12,50 €</td></tr></table>
</body></html>
"#;

const NO_STORE: &str = "<html><body><h1>Page not found</h1></body></html>";

fn reader() -> PageStateReader {
    let poll = Poll::new(Duration::from_millis(1), 2);
    PageStateReader::new(Polls {
        cart: poll,
        attach: poll,
        settle: poll,
        removal: poll,
        total_retries: 1,
    })
}

#[tokio::test]
async fn test_classic_listing_snapshot() {
    let page = SnapshotPage::new("http://shop.test/shop/", CLASSIC_SHOP);
    let reader = reader();

    assert_eq!(reader.probe(&page).await.unwrap(), Some(RenderMode::Classic));
    let cards = reader.list_products(&page).await.unwrap();
    assert_eq!(cards.len(), 3);

    assert_eq!(cards[0].name, "Leather Wallet");
    assert_eq!(cards[0].price, 70.0);
    assert!(matches!(
        &cards[0].action,
        PurchaseAction::AddToCart { product_id: Some(id), .. } if id == "12"
    ));

    assert!(cards[1].on_sale);
    assert_eq!(cards[1].price, 20.0, "sale price wins over the regular one");

    assert!(matches!(
        &cards[2].action,
        PurchaseAction::ViewDetails { url: Some(url) } if url == "/product/hoodie/"
    ));
}

#[tokio::test]
async fn test_classic_cart_snapshot() {
    let page = SnapshotPage::new("http://shop.test/cart/", CLASSIC_CART);
    let reader = reader();

    let lines = reader.read_cart(&page).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].name, "Leather Wallet");

    assert_eq!(reader.read_total(&page).await.unwrap().amount, 75.0);

    let shipping = reader.read_shipping(&page).await.unwrap();
    assert!(!shipping.free_available);
    assert!(shipping.only_paid_confirmed());
}

#[tokio::test]
async fn test_blocks_cart_snapshot() {
    let page = SnapshotPage::new("http://shop.test/cart/", BLOCKS_CART);
    let reader = reader();

    assert_eq!(reader.probe(&page).await.unwrap(), Some(RenderMode::Blocks));
    let names: Vec<_> = reader
        .read_cart(&page)
        .await
        .unwrap()
        .into_iter()
        .map(|line| line.name)
        .collect();
    assert_eq!(names, ["Leather Wallet", "Ankle Boots"]);

    assert_eq!(reader.read_total(&page).await.unwrap().amount, 118.0);
    assert!(reader.free_shipping_available(&page).await.unwrap());
    assert!(!reader.only_paid_shipping_available(&page).await.unwrap());
}

#[tokio::test]
async fn test_total_from_known_value_location() {
    let page = SnapshotPage::new("http://shop.test/checkout/", BARE_TOTAL);
    assert_eq!(reader().read_total(&page).await.unwrap().amount, 12.5);
}

#[tokio::test]
async fn test_page_without_storefront_markup() {
    let page = SnapshotPage::new("http://shop.test/missing/", NO_STORE);
    let reader = reader();

    assert_eq!(reader.probe(&page).await.unwrap(), None);
    assert!(reader.read_cart(&page).await.unwrap().is_empty());

    let err = reader.list_products(&page).await.unwrap_err();
    assert!(matches!(err, E2eError::NotFound(_)), "{err}");
    let err = reader.read_total(&page).await.unwrap_err();
    assert!(matches!(err, E2eError::NotFound(ref m) if m.contains("/missing/")), "{err}");

    let shipping = reader.read_shipping(&page).await.unwrap();
    assert!(!shipping.ui_present);
}

#[tokio::test]
async fn test_only_cart_pages_show_cart() {
    let reader = reader();
    let cases = [
        ("http://shop.test/shop/", CLASSIC_SHOP, false),
        ("http://shop.test/cart/", CLASSIC_CART, true),
        ("http://shop.test/cart/", BLOCKS_CART, true),
        ("http://shop.test/missing/", NO_STORE, false),
    ];
    for (url, html, expected) in cases {
        let page = SnapshotPage::new(url, html);
        assert_eq!(reader.shows_cart(&page).await.unwrap(), expected, "{url}");
    }
}
