//! Declarative YAML scenarios

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use shopcheck_common::{CartItem, FreeShippingRule, ProductCard};

use crate::error::{E2eError, E2eResult};
use crate::page::Page;
use crate::sequencer::FlowSequencer;

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<ScenarioStep>,
}

/// Which listing entries a step may pick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    /// Case-insensitive substring of the entry name
    pub name_contains: Option<String>,
    pub on_sale: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Only entries that can be added without visiting the product page
    pub direct: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, card: &ProductCard) -> bool {
        if let Some(needle) = &self.name_contains {
            if !card.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.on_sale.is_some_and(|on_sale| on_sale != card.on_sale) {
            return false;
        }
        if self.min_price.is_some_and(|min| card.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| card.price > max) {
            return false;
        }
        if self.direct.is_some_and(|direct| direct != card.action.is_direct()) {
            return false;
        }
        true
    }
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Open the product listing (falls back to the home page)
    NavigateListing,

    /// Add the first listing entry matching the filter
    AddProduct {
        #[serde(default)]
        filter: ProductFilter,
    },

    /// Keep adding matching entries until the cart total reaches `min_total`
    AddUntilTotal {
        #[serde(default)]
        filter: ProductFilter,
        min_total: f64,
        #[serde(default = "default_max_items")]
        max_items: usize,
    },

    /// Remove every cart line
    EmptyCart,

    /// The cart holds a row for each name
    ExpectCart { names: Vec<String> },

    /// The order total lies within bounds
    ExpectTotal {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },

    /// Get onto the checkout page
    ReachCheckout,

    /// Fill billing details and choose pay on delivery
    FillCheckout,

    /// Place the order
    SubmitOrder,

    /// Free shipping is (or is not) offered
    ExpectFreeShipping { available: bool },

    /// Only paid shipping methods are offered
    ExpectPaidShippingOnly {
        /// Also require rendered shipping UI
        #[serde(default)]
        confirmed: bool,
    },

    /// Free shipping matches the storefront policy for what this scenario added
    ExpectFreeShippingPolicy,

    /// The order-received page is shown
    ExpectOrderConfirmed,

    /// Log a message
    Log { message: String },
}

fn default_max_items() -> usize {
    10
}

impl ScenarioStep {
    /// Short label for logs and results
    pub fn name(&self) -> String {
        match self {
            ScenarioStep::NavigateListing => "navigate_listing".to_string(),
            ScenarioStep::AddProduct { filter } => match &filter.name_contains {
                Some(name) => format!("add_product:{}", name),
                None => "add_product".to_string(),
            },
            ScenarioStep::AddUntilTotal { min_total, .. } => format!("add_until_total:{:.2}", min_total),
            ScenarioStep::EmptyCart => "empty_cart".to_string(),
            ScenarioStep::ExpectCart { names } => format!("expect_cart:{}", names.join(",")),
            ScenarioStep::ExpectTotal { .. } => "expect_total".to_string(),
            ScenarioStep::ReachCheckout => "reach_checkout".to_string(),
            ScenarioStep::FillCheckout => "fill_checkout".to_string(),
            ScenarioStep::SubmitOrder => "submit_order".to_string(),
            ScenarioStep::ExpectFreeShipping { available } => format!("expect_free_shipping:{}", available),
            ScenarioStep::ExpectPaidShippingOnly { .. } => "expect_paid_shipping_only".to_string(),
            ScenarioStep::ExpectFreeShippingPolicy => "expect_free_shipping_policy".to_string(),
            ScenarioStep::ExpectOrderConfirmed => "expect_order_confirmed".to_string(),
            ScenarioStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

/// Per-scenario bookkeeping shared between steps
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    /// Cards this scenario put into the cart, in order
    pub added: Vec<ProductCard>,
    pub free_shipping: FreeShippingRule,
}

impl ScenarioContext {
    pub fn new(free_shipping: FreeShippingRule) -> Self {
        Self {
            added: Vec::new(),
            free_shipping,
        }
    }

    /// Cart as the shipping hook sees it
    pub fn cart_items(&self) -> Vec<CartItem> {
        self.added
            .iter()
            .map(|card| CartItem {
                name: card.name.clone(),
                price: card.price,
                on_sale: card.on_sale,
            })
            .collect()
    }

    /// Free shipping the storefront ought to offer for what was added
    pub fn expected_free_shipping(&self) -> bool {
        let items = self.cart_items();
        let subtotal: f64 = items.iter().map(|item| item.price).sum();
        self.free_shipping.evaluate(subtotal, &items)
    }

    /// Execute one step against a page
    pub async fn run_step(
        &mut self,
        flows: &FlowSequencer,
        page: &dyn Page,
        step: &ScenarioStep,
    ) -> E2eResult<()> {
        let reader = flows.reader();
        match step {
            ScenarioStep::NavigateListing => {
                let cards = flows.navigate_to_listing(page).await?;
                debug!("{} listing entries", cards.len());
            }
            ScenarioStep::AddProduct { filter } => {
                let card = flows.add_first_matching(page, |c| filter.matches(c)).await?;
                self.added.push(card);
            }
            ScenarioStep::AddUntilTotal {
                filter,
                min_total,
                max_items,
            } => {
                let (cards, total) = flows
                    .add_until_total(page, |c| filter.matches(c), *min_total, *max_items)
                    .await?;
                info!("cart total {:.2} after {} items", total.amount, cards.len());
                self.added.extend(cards);
            }
            ScenarioStep::EmptyCart => {
                flows.empty_cart(page).await?;
                self.added.clear();
            }
            ScenarioStep::ExpectCart { names } => {
                flows.goto_cart(page).await?;
                flows.assert_cart_has(page, names.as_slice()).await?;
            }
            ScenarioStep::ExpectTotal { min, max } => {
                flows.goto_cart(page).await?;
                let total = reader.read_total(page).await?;
                let below = min.is_some_and(|min| total.amount < min);
                let above = max.is_some_and(|max| total.amount > max);
                if below || above {
                    return Err(E2eError::AssertionFailed(format!(
                        "order total {:.2} outside [{:?}, {:?}]",
                        total.amount, min, max
                    )));
                }
            }
            ScenarioStep::ReachCheckout => flows.reach_checkout(page).await?,
            ScenarioStep::FillCheckout => {
                flows.fill_checkout(page).await?;
                flows.select_pay_on_delivery(page).await?;
            }
            ScenarioStep::SubmitOrder => {
                if !flows.submit_order(page).await? {
                    return Err(E2eError::NotFound("place-order control".to_string()));
                }
            }
            ScenarioStep::ExpectFreeShipping { available } => {
                flows.goto_cart(page).await?;
                let observed = reader.free_shipping_available(page).await?;
                if observed != *available {
                    return Err(E2eError::AssertionFailed(format!(
                        "free shipping available: expected {}, observed {}",
                        available, observed
                    )));
                }
            }
            ScenarioStep::ExpectPaidShippingOnly { confirmed } => {
                flows.goto_cart(page).await?;
                let paid_only = if *confirmed {
                    reader.read_shipping(page).await?.only_paid_confirmed()
                } else {
                    reader.only_paid_shipping_available(page).await?
                };
                if !paid_only {
                    return Err(E2eError::AssertionFailed(
                        "expected paid shipping only".to_string(),
                    ));
                }
            }
            ScenarioStep::ExpectFreeShippingPolicy => {
                let expected = self.expected_free_shipping();
                flows.goto_cart(page).await?;
                let observed = reader.free_shipping_available(page).await?;
                if observed != expected {
                    return Err(E2eError::AssertionFailed(format!(
                        "free shipping available: policy says {} for {:?}, page shows {}",
                        expected,
                        self.added.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                        observed
                    )));
                }
            }
            ScenarioStep::ExpectOrderConfirmed => flows.assert_order_confirmed(page).await?,
            ScenarioStep::Log { message } => info!("[SCENARIO LOG] {}", message),
        }
        Ok(())
    }
}

impl Scenario {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::ScenarioParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.push(Self::from_file(entry.path())?);
        }

        Ok(scenarios)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }
}
