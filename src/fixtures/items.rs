//! Cart Item Fixtures

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{BRL, Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, items::LineItem};

/// Wrapper for cart items in YAML
#[derive(Debug, Deserialize)]
pub struct ItemsFixture {
    /// Line items in cart order
    pub items: Vec<ItemFixture>,
}

/// Line Item Fixture
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Product identifier
    pub product_id: String,

    /// Product name
    #[serde(default)]
    pub name: Option<String>,

    /// Unit price (e.g., "100.00 BRL")
    pub price: String,

    /// Listed price before markdown (e.g., "120.00 BRL")
    #[serde(default)]
    pub compare_at_price: Option<String>,

    /// Quantity, at least one
    pub quantity: u32,
}

impl TryFrom<ItemFixture> for LineItem<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ItemFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        let mut item = LineItem::try_new(
            fixture.product_id.clone(),
            Money::from_minor(minor_units, currency),
            fixture.quantity,
        )
        .ok_or(FixtureError::InvalidQuantity(fixture.product_id))?;

        if let Some(name) = fixture.name {
            item = item.with_name(name);
        }

        if let Some(compare_at) = fixture.compare_at_price {
            let (compare_minor, compare_currency) = parse_price(&compare_at)?;

            if compare_currency != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    compare_currency.iso_alpha_code.to_string(),
                ));
            }

            item = item.with_compare_at_price(Money::from_minor(compare_minor, currency));
        }

        Ok(item)
    }
}

/// Parse price string (e.g., "22.50 BRL") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, is negative, or if the
/// currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "BRL" => BRL,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
