//! Items

use std::{fmt, num::NonZeroU32};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::pricing::PricingError;

/// Opaque product identifier, as issued by the cart store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single product entry in a cart.
///
/// The quantity is always at least one; a line that would drop to zero is
/// removed from the cart instead.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    product_id: ProductId,
    name: Option<String>,
    unit_price: Money<'a, Currency>,
    compare_at_price: Option<Money<'a, Currency>>,
    quantity: NonZeroU32,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item.
    pub fn new(
        product_id: impl Into<ProductId>,
        unit_price: Money<'a, Currency>,
        quantity: NonZeroU32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: None,
            unit_price,
            compare_at_price: None,
            quantity,
        }
    }

    /// Creates a new line item from a raw quantity.
    ///
    /// Returns `None` when `quantity` is zero.
    pub fn try_new(
        product_id: impl Into<ProductId>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Option<Self> {
        NonZeroU32::new(quantity).map(|quantity| Self::new(product_id, unit_price, quantity))
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the price the product was listed at before any markdown.
    #[must_use]
    pub fn with_compare_at_price(mut self, price: Money<'a, Currency>) -> Self {
        self.compare_at_price = Some(price);
        self
    }

    /// Returns the product identifier
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the display name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the compare-at price, if any
    pub fn compare_at_price(&self) -> Option<&Money<'a, Currency>> {
        self.compare_at_price.as_ref()
    }

    /// Returns the quantity
    pub fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    /// Returns a copy of this line with a different quantity.
    #[must_use]
    pub fn with_quantity(&self, quantity: NonZeroU32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Returns the currency of the unit price.
    pub fn currency(&self) -> &'a Currency {
        self.unit_price.currency()
    }

    /// Calculates `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity.get()))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(minor, self.currency()))
    }

    /// Savings against the compare-at price for the whole line.
    ///
    /// Returns `None` when no compare-at price is set or it is not higher than the unit price.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the savings do not fit in minor units.
    pub fn line_savings(&self) -> Result<Option<Money<'a, Currency>>, PricingError> {
        let Some(compare_at) = self.compare_at_price else {
            return Ok(None);
        };

        let per_unit = compare_at
            .to_minor_units()
            .saturating_sub(self.unit_price.to_minor_units());

        if per_unit <= 0 {
            return Ok(None);
        }

        let minor = per_unit
            .checked_mul(i64::from(self.quantity.get()))
            .ok_or(PricingError::Overflow)?;

        Ok(Some(Money::from_minor(minor, self.currency())))
    }
}
