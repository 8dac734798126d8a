//! Cart summary
//!
//! [`CartSummary`] is derived, never stored: [`CartPricer::summarize`]
//! recomputes it from the current cart, configuration and active coupon.

use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    cart::Cart,
    config::PricingConfig,
    coupons::{Coupon, CouponOutcome, CouponSlot},
    pricing::{
        InstallmentPlan, PricingError, compute_installments, compute_total, ensure_same_currency,
        zero,
    },
    shipping::{FreeShipping, FreeShippingProgress},
};

/// Priced view of a cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartSummary<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Coupon reduction of the subtotal
    pub discount: Money<'a, Currency>,

    /// Shipping charge after any waiver
    pub shipping: Money<'a, Currency>,

    /// `max(0, subtotal - discount + shipping)`
    pub total: Money<'a, Currency>,

    /// Display-only installment breakdown of the total
    pub installments: InstallmentPlan<'a>,

    /// Which free-shipping triggers applied
    pub free_shipping: FreeShipping,

    /// Progress towards the free-shipping threshold, if one is configured
    pub free_shipping_progress: Option<FreeShippingProgress<'a>>,

    /// Code of the coupon that contributed to this summary
    pub coupon: Option<String>,
}

impl<'a> CartSummary<'a> {
    /// Money saved through the discount and any shipping waiver.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the amounts are in different currencies.
    pub fn savings(
        &self,
        shipping_base: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let waived = if self.free_shipping.applies() {
            *shipping_base
        } else {
            zero(self.subtotal.currency())
        };

        // Only the part of the discount that the subtotal could absorb counts.
        let effective_discount = self
            .discount
            .to_minor_units()
            .min(self.subtotal.to_minor_units())
            .max(0);

        Ok(waived.add(Money::from_minor(
            effective_discount,
            self.subtotal.currency(),
        ))?)
    }
}

/// Prices carts with a configuration and a single active coupon.
#[derive(Clone, Debug, Default)]
pub struct CartPricer<'a> {
    config: PricingConfig<'a>,
    coupon: CouponSlot<'a>,
}

impl<'a> CartPricer<'a> {
    /// Create a pricer with no active coupon.
    pub fn new(config: PricingConfig<'a>) -> Self {
        Self {
            config,
            coupon: CouponSlot::new(),
        }
    }

    /// The pricing configuration
    pub fn config(&self) -> &PricingConfig<'a> {
        &self.config
    }

    /// The active coupon, if any
    pub fn active_coupon(&self) -> Option<&Coupon<'a>> {
        self.coupon.active()
    }

    /// Apply a user-entered coupon code against the cart's current subtotal.
    ///
    /// A recognised code replaces the active coupon. A rejected code leaves it in place.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal or discount cannot be calculated.
    pub fn apply_coupon(
        &mut self,
        cart: &Cart<'a>,
        code: &str,
    ) -> Result<CouponOutcome<'a>, PricingError> {
        let subtotal = cart.subtotal()?;

        self.coupon.apply(self.config.coupons(), code, &subtotal)
    }

    /// Remove the active coupon.
    pub fn clear_coupon(&mut self) -> Option<Coupon<'a>> {
        self.coupon.clear()
    }

    /// Derive a summary for `cart`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart is in another currency or an amount overflows.
    pub fn summarize(&self, cart: &Cart<'a>) -> Result<CartSummary<'a>, PricingError> {
        let subtotal = cart.subtotal()?;
        let currency = self.config.currency();

        ensure_same_currency(&zero(currency), &subtotal)?;

        let active = self.coupon.active();

        let discount = match active {
            Some(coupon) => coupon.discount_on(&subtotal)?,
            None => zero(currency),
        };

        let policy = self.config.shipping();

        // Nothing to ship, so nothing is waived either.
        let (free_shipping, shipping) = if cart.is_empty() {
            (FreeShipping::default(), zero(currency))
        } else {
            let free_shipping =
                policy.free_shipping(&subtotal, active.is_some_and(Coupon::waives_shipping))?;

            (free_shipping, policy.charge(free_shipping))
        };

        let total = compute_total(subtotal, discount, shipping)?;
        let installments = compute_installments(total, self.config.installments())?;

        debug!(
            lines = cart.len(),
            %subtotal,
            %discount,
            %shipping,
            %total,
            "cart summarised"
        );

        Ok(CartSummary {
            subtotal,
            discount,
            shipping,
            total,
            installments,
            free_shipping,
            free_shipping_progress: policy.progress(&subtotal),
            coupon: active.map(|coupon| coupon.code().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rusty_money::iso::{BRL, USD};
    use testresult::TestResult;

    use crate::{items::LineItem, shipping::ShippingPolicy};

    use super::*;

    fn brl<'a>(minor: i64) -> Money<'a, Currency> {
        Money::from_minor(minor, BRL)
    }

    fn cart<'a>() -> TestResult<Cart<'a>> {
        let items = [
            LineItem::try_new("a", brl(10_000), 2).ok_or("zero quantity")?,
            LineItem::try_new("b", brl(50_00), 1).ok_or("zero quantity")?,
        ];

        Ok(Cart::with_items(items, BRL)?)
    }

    fn pricer_with_shipping<'a>(base: i64, threshold: Option<i64>) -> TestResult<CartPricer<'a>> {
        let policy = ShippingPolicy::new(brl(base), threshold.map(brl))?;
        let config = PricingConfig::new(
            policy,
            crate::coupons::CouponTable::storefront(),
            NonZeroU32::new(10).ok_or("zero installments")?,
        );

        Ok(CartPricer::new(config))
    }

    #[test]
    fn summary_without_coupon() -> TestResult {
        let pricer = pricer_with_shipping(0, None)?;
        let summary = pricer.summarize(&cart()?)?;

        assert_eq!(summary.subtotal, brl(25_000));
        assert_eq!(summary.discount, brl(0));
        assert_eq!(summary.total, brl(25_000));
        assert_eq!(summary.installments.amount(), brl(25_00));
        assert_eq!(summary.coupon, None);

        Ok(())
    }

    #[test]
    fn percentage_coupon_reduces_total() -> TestResult {
        let cart = cart()?;
        let mut pricer = pricer_with_shipping(0, None)?;

        assert!(pricer.apply_coupon(&cart, "SAN10")?.is_applied());

        let summary = pricer.summarize(&cart)?;

        assert_eq!(summary.discount, brl(25_00));
        assert_eq!(summary.total, brl(22_500));
        assert_eq!(summary.installments.amount(), brl(22_50));
        assert_eq!(summary.coupon.as_deref(), Some("SAN10"));

        Ok(())
    }

    #[test]
    fn rejected_coupon_leaves_summary_unchanged() -> TestResult {
        let cart = cart()?;
        let mut pricer = pricer_with_shipping(15_00, Some(50_000))?;

        pricer.apply_coupon(&cart, "SAN10")?;
        let before = pricer.summarize(&cart)?;

        let outcome = pricer.apply_coupon(&cart, "NOT-A-CODE")?;
        let after = pricer.summarize(&cart)?;

        assert!(!outcome.is_applied());
        assert_eq!(before.subtotal, after.subtotal);
        assert_eq!(before.discount, after.discount);
        assert_eq!(before.shipping, after.shipping);
        assert_eq!(before, after);

        Ok(())
    }

    #[test]
    fn threshold_waives_shipping() -> TestResult {
        let pricer = pricer_with_shipping(30_00, Some(20_000))?;
        let summary = pricer.summarize(&cart()?)?;

        assert!(summary.free_shipping.threshold);
        assert_eq!(summary.shipping, brl(0));
        assert_eq!(summary.total, brl(25_000));

        Ok(())
    }

    #[test]
    fn free_shipping_coupon_waives_shipping_below_threshold() -> TestResult {
        let cart = cart()?.with_quantity(&"a".into(), 1);
        let mut pricer = pricer_with_shipping(30_00, Some(20_000))?;

        let before = pricer.summarize(&cart)?;
        assert_eq!(before.shipping, brl(30_00));
        assert_eq!(before.total, brl(18_000));

        pricer.apply_coupon(&cart, "fretegratis")?;
        let after = pricer.summarize(&cart)?;

        assert!(after.free_shipping.coupon);
        assert!(!after.free_shipping.threshold);
        assert_eq!(after.shipping, brl(0));
        assert_eq!(after.discount, brl(0));
        assert_eq!(after.total, brl(15_000));
        assert_eq!(after.savings(&pricer.config().shipping().base())?, brl(30_00));

        Ok(())
    }

    #[test]
    fn new_coupon_replaces_previous_effect() -> TestResult {
        let cart = cart()?;
        let mut pricer = pricer_with_shipping(30_00, Some(100_000))?;

        pricer.apply_coupon(&cart, "fretegratis")?;
        pricer.apply_coupon(&cart, "desconto10")?;

        let summary = pricer.summarize(&cart)?;

        assert_eq!(summary.discount, brl(25_00));
        assert_eq!(summary.shipping, brl(30_00), "free shipping no longer active");

        Ok(())
    }

    #[test]
    fn discount_follows_the_current_subtotal() -> TestResult {
        let cart = cart()?;
        let mut pricer = pricer_with_shipping(0, None)?;

        pricer.apply_coupon(&cart, "SAN10")?;

        let smaller = cart.with_quantity(&"a".into(), 0);
        let summary = pricer.summarize(&smaller)?;

        assert_eq!(summary.subtotal, brl(50_00));
        assert_eq!(summary.discount, brl(5_00));

        Ok(())
    }

    #[test]
    fn empty_cart_totals_are_zero() -> TestResult {
        let pricer = pricer_with_shipping(0, Some(20_000))?;
        let summary = pricer.summarize(&Cart::new(BRL))?;

        assert_eq!(summary.subtotal, brl(0));
        assert_eq!(summary.total, brl(0));
        assert_eq!(summary.installments.amount(), brl(0));
        assert_eq!(
            summary.free_shipping_progress.map(|p| p.remaining()),
            Some(brl(20_000))
        );

        Ok(())
    }

    #[test]
    fn empty_cart_is_not_charged_shipping() -> TestResult {
        let pricer = pricer_with_shipping(18_90, Some(20_000))?;
        let summary = pricer.summarize(&cart()?.cleared())?;

        assert_eq!(summary.shipping, brl(0));
        assert_eq!(summary.total, brl(0));
        assert!(!summary.free_shipping.applies());

        Ok(())
    }

    #[test]
    fn empty_cart_with_free_shipping_coupon_waives_nothing() -> TestResult {
        let empty = Cart::new(BRL);
        let mut pricer = pricer_with_shipping(18_90, Some(20_000))?;

        assert!(pricer.apply_coupon(&empty, "FRETEGRATIS")?.is_applied());

        let summary = pricer.summarize(&empty)?;

        assert_eq!(summary.free_shipping, FreeShipping::default());
        assert_eq!(summary.shipping, brl(0));
        assert_eq!(summary.total, brl(0));
        assert_eq!(summary.savings(&pricer.config().shipping().base())?, brl(0));
        assert_eq!(summary.coupon.as_deref(), Some("FRETEGRATIS"));

        Ok(())
    }

    #[test]
    fn summarize_rejects_cart_in_other_currency() -> TestResult {
        let pricer = pricer_with_shipping(0, None)?;

        assert!(matches!(
            pricer.summarize(&Cart::new(USD)),
            Err(PricingError::Money(_))
        ));

        Ok(())
    }

    #[test]
    fn clearing_coupon_restores_full_price() -> TestResult {
        let cart = cart()?;
        let mut pricer = pricer_with_shipping(0, None)?;

        pricer.apply_coupon(&cart, "SAN10")?;
        assert!(pricer.clear_coupon().is_some());

        assert_eq!(pricer.summarize(&cart)?.total, brl(25_000));
        assert!(pricer.active_coupon().is_none());

        Ok(())
    }
}
