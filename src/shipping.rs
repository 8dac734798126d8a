//! Shipping
//!
//! Shipping is waived when the subtotal reaches the free-shipping threshold or
//! when a free-shipping coupon is active. The two triggers are independent.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::pricing::{PricingError, ensure_same_currency, zero};

/// Returns `true` when `subtotal ≥ threshold`.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if the amounts are in different currencies.
pub fn is_free_shipping_eligible(
    subtotal: &Money<'_, Currency>,
    threshold: &Money<'_, Currency>,
) -> Result<bool, PricingError> {
    ensure_same_currency(threshold, subtotal)?;

    Ok(subtotal.to_minor_units() >= threshold.to_minor_units())
}

/// Why shipping was waived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FreeShipping {
    /// The subtotal reached the threshold.
    pub threshold: bool,

    /// A free-shipping coupon is active.
    pub coupon: bool,
}

impl FreeShipping {
    /// Whether any trigger applies.
    pub fn applies(&self) -> bool {
        self.threshold || self.coupon
    }
}

/// Base shipping charge and the optional free-shipping threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShippingPolicy<'a> {
    base: Money<'a, Currency>,
    free_threshold: Option<Money<'a, Currency>>,
}

impl<'a> ShippingPolicy<'a> {
    /// Create a policy.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] if the threshold is in another currency.
    pub fn new(
        base: Money<'a, Currency>,
        free_threshold: Option<Money<'a, Currency>>,
    ) -> Result<Self, PricingError> {
        if let Some(threshold) = &free_threshold {
            ensure_same_currency(&base, threshold)?;
        }

        Ok(Self {
            base: clamp_non_negative(base),
            free_threshold: free_threshold.map(clamp_non_negative),
        })
    }

    /// Shipping always charged at `base`.
    pub fn flat(base: Money<'a, Currency>) -> Self {
        Self {
            base: clamp_non_negative(base),
            free_threshold: None,
        }
    }

    /// Base charge
    pub fn base(&self) -> Money<'a, Currency> {
        self.base
    }

    /// Free-shipping threshold, if any
    pub fn free_threshold(&self) -> Option<Money<'a, Currency>> {
        self.free_threshold
    }

    /// Currency of the policy
    pub fn currency(&self) -> &'a Currency {
        self.base.currency()
    }

    /// Returns a copy with a different base charge.
    #[must_use]
    pub fn with_base(&self, base: Money<'a, Currency>) -> Self {
        Self {
            base: clamp_non_negative(base),
            ..*self
        }
    }

    /// Evaluate both free-shipping triggers for `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] if `subtotal` is in another currency than the threshold.
    pub fn free_shipping(
        &self,
        subtotal: &Money<'a, Currency>,
        coupon: bool,
    ) -> Result<FreeShipping, PricingError> {
        let threshold = match &self.free_threshold {
            Some(threshold) => is_free_shipping_eligible(subtotal, threshold)?,
            None => false,
        };

        Ok(FreeShipping { threshold, coupon })
    }

    /// Shipping charge after applying the free-shipping triggers.
    pub fn charge(&self, free: FreeShipping) -> Money<'a, Currency> {
        if free.applies() {
            zero(self.currency())
        } else {
            self.base
        }
    }

    /// Progress towards the free-shipping threshold, if there is one.
    pub fn progress(&self, subtotal: &Money<'a, Currency>) -> Option<FreeShippingProgress<'a>> {
        self.free_threshold
            .map(|threshold| FreeShippingProgress::new(subtotal, &threshold))
    }
}

/// How far a subtotal is from the free-shipping threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeShippingProgress<'a> {
    remaining: Money<'a, Currency>,
    fraction: Percentage,
}

impl<'a> FreeShippingProgress<'a> {
    /// Calculate progress of `subtotal` towards `threshold`.
    pub fn new(subtotal: &Money<'a, Currency>, threshold: &Money<'a, Currency>) -> Self {
        let subtotal_minor = subtotal.to_minor_units().max(0);
        let threshold_minor = threshold.to_minor_units().max(0);

        let remaining = threshold_minor.saturating_sub(subtotal_minor).max(0);

        let fraction = if threshold_minor == 0 || subtotal_minor >= threshold_minor {
            Decimal::ONE
        } else {
            let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);
            let threshold_dec = Decimal::from_i64(threshold_minor).unwrap_or(Decimal::ONE);

            (subtotal_dec / threshold_dec).min(Decimal::ONE)
        };

        Self {
            remaining: Money::from_minor(remaining, threshold.currency()),
            fraction: Percentage::from(fraction),
        }
    }

    /// Amount still needed to reach the threshold (zero once reached)
    pub fn remaining(&self) -> Money<'a, Currency> {
        self.remaining
    }

    /// Progress as a fraction in `[0, 1]`
    pub fn fraction(&self) -> Percentage {
        self.fraction
    }

    /// Whether the threshold has been reached.
    pub fn is_reached(&self) -> bool {
        self.remaining.to_minor_units() == 0
    }
}

fn clamp_non_negative(amount: Money<'_, Currency>) -> Money<'_, Currency> {
    if amount.to_minor_units() < 0 {
        zero(amount.currency())
    } else {
        amount
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{BRL, USD};
    use testresult::TestResult;

    use super::*;

    fn brl<'a>(minor: i64) -> Money<'a, Currency> {
        Money::from_minor(minor, BRL)
    }

    #[test]
    fn eligibility_is_inclusive_of_threshold() -> TestResult {
        assert!(is_free_shipping_eligible(&brl(25_000), &brl(20_000))?);
        assert!(is_free_shipping_eligible(&brl(20_000), &brl(20_000))?);
        assert!(!is_free_shipping_eligible(&brl(19_999), &brl(20_000))?);

        Ok(())
    }

    #[test]
    fn eligibility_rejects_mixed_currencies() {
        let result = is_free_shipping_eligible(&brl(25_000), &Money::from_minor(20_000, USD));

        assert!(matches!(result, Err(PricingError::Money(_))));
    }

    #[test]
    fn threshold_forces_zero_shipping() -> TestResult {
        let policy = ShippingPolicy::new(brl(15_00), Some(brl(20_000)))?;

        let free = policy.free_shipping(&brl(25_000), false)?;

        assert!(free.threshold);
        assert!(!free.coupon);
        assert_eq!(policy.charge(free), brl(0));

        Ok(())
    }

    #[test]
    fn coupon_and_threshold_are_independent() -> TestResult {
        let policy = ShippingPolicy::new(brl(15_00), Some(brl(20_000)))?;

        let below_with_coupon = policy.free_shipping(&brl(50_00), true)?;
        let below_without = policy.free_shipping(&brl(50_00), false)?;

        assert_eq!(policy.charge(below_with_coupon), brl(0));
        assert_eq!(policy.charge(below_without), brl(15_00));

        Ok(())
    }

    #[test]
    fn flat_policy_only_waived_by_coupon() -> TestResult {
        let policy = ShippingPolicy::flat(brl(12_00));

        assert_eq!(
            policy.charge(policy.free_shipping(&brl(100_000), false)?),
            brl(12_00)
        );
        assert_eq!(policy.charge(policy.free_shipping(&brl(0), true)?), brl(0));
        assert!(policy.progress(&brl(10_00)).is_none());

        Ok(())
    }

    #[test]
    fn new_rejects_mixed_currencies() {
        let result = ShippingPolicy::new(brl(10_00), Some(Money::from_minor(10_000, USD)));

        assert!(matches!(result, Err(PricingError::Money(_))));
    }

    #[test]
    fn negative_base_is_clamped_to_zero() {
        assert_eq!(ShippingPolicy::flat(brl(-5_00)).base(), brl(0));
    }

    #[test]
    fn progress_reports_remaining_amount() {
        let progress = FreeShippingProgress::new(&brl(15_000), &brl(20_000));

        assert_eq!(progress.remaining(), brl(50_00));
        assert_eq!(progress.fraction(), Percentage::from(Decimal::new(75, 2)));
        assert!(!progress.is_reached());
    }

    #[test]
    fn progress_is_clamped_once_reached() {
        let progress = FreeShippingProgress::new(&brl(35_000), &brl(20_000));

        assert_eq!(progress.remaining(), brl(0));
        assert_eq!(progress.fraction(), Percentage::from(Decimal::ONE));
        assert!(progress.is_reached());
    }
}
