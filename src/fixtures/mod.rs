//! Fixtures
//!
//! YAML cart snapshots and pricing configurations, laid out as
//! `<base>/carts/<name>.yml` and `<base>/pricing/<name>.yml`.

use std::{fs, path::PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    config::PricingConfig,
    fixtures::{items::ItemsFixture, pricing::PricingFixture},
    items::LineItem,
    pricing::PricingError,
};

pub mod items;
pub mod pricing;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Line item with a quantity below one
    #[error("Invalid quantity for product: {0}")]
    InvalidQuantity(String),

    /// Blank or duplicate coupon code
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),

    /// Installment count of zero
    #[error("Installment count must be at least one")]
    InvalidInstallments,

    /// No items or pricing loaded yet
    #[error("No items or pricing loaded yet; currency unknown")]
    NoCurrency,

    /// No pricing configuration loaded
    #[error("No pricing configuration loaded")]
    NoPricing,

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),

    /// Pricing configuration error
    #[error("Invalid pricing configuration: {0}")]
    Pricing(#[from] PricingError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Line items in cart order
    items: Vec<LineItem<'static>>,

    /// Pricing configuration, once loaded
    pricing: Option<PricingConfig<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static rusty_money::iso::Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            items: Vec::new(),
            pricing: None,
            currency: None,
        }
    }

    /// Load cart items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if there are currency mismatches.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ItemsFixture = serde_norway::from_str(&contents)?;

        for item_fixture in fixture.items {
            let item = LineItem::try_from(item_fixture)?;

            self.check_currency(item.currency())?;
            self.items.push(item);
        }

        debug!(path = %file_path.display(), items = self.items.len(), "loaded cart fixture");

        Ok(self)
    }

    /// Load a pricing configuration from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its prices are invalid.
    pub fn load_pricing(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("pricing").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: PricingFixture = serde_norway::from_str(&contents)?;

        let config = PricingConfig::try_from(fixture)?;

        self.check_currency(config.currency())?;

        debug!(
            path = %file_path.display(),
            coupons = config.coupons().len(),
            "loaded pricing fixture"
        );

        self.pricing = Some(config);

        Ok(self)
    }

    /// Load a complete fixture set (cart and pricing with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_pricing(name)?.load_cart(name)?;

        Ok(fixture)
    }

    /// Get all line items
    pub fn items(&self) -> &[LineItem<'static>] {
        &self.items
    }

    /// Create a cart from the loaded items
    ///
    /// An empty fixture yields an empty cart in the fixture currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown or cart creation fails.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency()?;

        Ok(Cart::with_items(self.items.clone(), currency)?)
    }

    /// Get the pricing configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no pricing fixture has been loaded.
    pub fn pricing(&self) -> Result<&PricingConfig<'static>, FixtureError> {
        self.pricing.as_ref().ok_or(FixtureError::NoPricing)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been loaded yet.
    pub fn currency(&self) -> Result<&'static rusty_money::iso::Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn check_currency(
        &mut self,
        currency: &'static rusty_money::iso::Currency,
    ) -> Result<(), FixtureError> {
        if let Some(existing_currency) = self.currency {
            if existing_currency != currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing_currency.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        Ok(())
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
