//! Pricing
//!
//! Totals, percentage arithmetic and installment breakdowns. Amounts are
//! computed in minor units and rounded half-up.

use std::num::NonZeroU32;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A calculation did not fit in minor units.
    #[error("amount overflowed while calculating in minor units")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `max(0, subtotal - discount + shipping)`.
///
/// # Errors
///
/// - [`PricingError::Money`]: the amounts do not share a currency.
/// - [`PricingError::Overflow`]: the sum does not fit in minor units.
pub fn compute_total<'a>(
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    ensure_same_currency(&subtotal, &discount)?;
    ensure_same_currency(&subtotal, &shipping)?;

    let total = subtotal
        .to_minor_units()
        .checked_sub(discount.to_minor_units())
        .and_then(|value| value.checked_add(shipping.to_minor_units()))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(total.max(0), subtotal.currency()))
}

/// A total divided evenly into a number of display-only payments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstallmentPlan<'a> {
    count: NonZeroU32,
    amount: Money<'a, Currency>,
}

impl<'a> InstallmentPlan<'a> {
    /// Number of payments
    pub fn count(&self) -> NonZeroU32 {
        self.count
    }

    /// Amount of each payment
    pub fn amount(&self) -> Money<'a, Currency> {
        self.amount
    }

    /// Difference between `amount × count` and the total it was derived from, in minor units.
    ///
    /// Positive when rounding made the payments add up to more than the total.
    pub fn rounding_difference(&self, total: &Money<'a, Currency>) -> i64 {
        self.amount
            .to_minor_units()
            .saturating_mul(i64::from(self.count.get()))
            .saturating_sub(total.to_minor_units())
    }
}

/// Splits `total` into `n` equal payments rounded half-up to the currency's minor unit.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the division cannot be represented.
pub fn compute_installments(
    total: Money<'_, Currency>,
    n: NonZeroU32,
) -> Result<InstallmentPlan<'_>, PricingError> {
    let total_minor = Decimal::from_i64(total.to_minor_units()).ok_or(PricingError::Overflow)?;

    let amount = total_minor
        .checked_div(Decimal::from(n.get()))
        .ok_or(PricingError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::Overflow)?;

    Ok(InstallmentPlan {
        count: n,
        amount: Money::from_minor(amount, total.currency()),
    })
}

/// Calculate a percentage of a minor unit amount, rounded half-up.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result does not fit in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // the crate has no accessor for the inner Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Calculate a percentage of a money amount.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result does not fit in minor units.
pub fn percent_of<'a>(
    percent: &Percentage,
    amount: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = percent_of_minor(percent, amount.to_minor_units())?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// Zero in the given currency.
pub fn zero(currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(0, currency)
}

pub(crate) fn ensure_same_currency(
    expected: &Money<'_, Currency>,
    actual: &Money<'_, Currency>,
) -> Result<(), PricingError> {
    if expected.currency() == actual.currency() {
        Ok(())
    } else {
        Err(PricingError::Money(MoneyError::CurrencyMismatch {
            expected: expected.currency().iso_alpha_code,
            actual: actual.currency().iso_alpha_code,
        }))
    }
}
