//! Pricing configuration
//!
//! Everything that used to be a literal in the storefront (coupon table,
//! free-shipping threshold, installment count) is passed in through
//! [`PricingConfig`].

use std::num::NonZeroU32;

use rusty_money::{
    Money,
    iso::{self, Currency},
};

use crate::{coupons::CouponTable, shipping::ShippingPolicy};

/// Default number of interest-free installments shown at checkout.
pub const DEFAULT_INSTALLMENTS: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Default free-shipping threshold, in minor units.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD_MINOR: i64 = 20_000;

/// Parameters for pricing a cart.
#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig<'a> {
    currency: &'a Currency,
    shipping: ShippingPolicy<'a>,
    coupons: CouponTable<'a>,
    installments: NonZeroU32,
}

impl<'a> PricingConfig<'a> {
    /// Create a configuration.
    pub fn new(
        shipping: ShippingPolicy<'a>,
        coupons: CouponTable<'a>,
        installments: NonZeroU32,
    ) -> Self {
        Self {
            currency: shipping.currency(),
            shipping,
            coupons,
            installments,
        }
    }

    /// Currency all amounts are priced in
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Shipping policy
    pub fn shipping(&self) -> &ShippingPolicy<'a> {
        &self.shipping
    }

    /// Recognised coupons
    pub fn coupons(&self) -> &CouponTable<'a> {
        &self.coupons
    }

    /// Number of installments to display
    pub fn installments(&self) -> NonZeroU32 {
        self.installments
    }

    /// Returns a copy with a different shipping base charge.
    #[must_use]
    pub fn with_shipping_base(mut self, base: Money<'a, Currency>) -> Self {
        self.shipping = self.shipping.with_base(base);
        self
    }

    /// Returns a copy with a different installment count.
    #[must_use]
    pub fn with_installments(mut self, installments: NonZeroU32) -> Self {
        self.installments = installments;
        self
    }
}

impl Default for PricingConfig<'_> {
    /// BRL, no base shipping, free shipping from R$200.00, ten installments and the
    /// storefront coupons.
    fn default() -> Self {
        let shipping = ShippingPolicy::flat(Money::from_minor(0, iso::BRL));

        Self::new(
            ShippingPolicy::new(
                shipping.base(),
                Some(Money::from_minor(
                    DEFAULT_FREE_SHIPPING_THRESHOLD_MINOR,
                    iso::BRL,
                )),
            )
            .unwrap_or(shipping),
            CouponTable::storefront(),
            DEFAULT_INSTALLMENTS,
        )
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::BRL;

    use super::*;

    #[test]
    fn default_matches_storefront() {
        let config = PricingConfig::default();

        assert_eq!(config.currency(), BRL);
        assert_eq!(config.installments().get(), 10);
        assert_eq!(config.shipping().base(), Money::from_minor(0, BRL));
        assert_eq!(
            config.shipping().free_threshold(),
            Some(Money::from_minor(20_000, BRL))
        );
        assert!(config.coupons().get("san10").is_some());
    }

    #[test]
    fn builders_replace_single_fields() {
        let config = PricingConfig::default()
            .with_shipping_base(Money::from_minor(18_90, BRL))
            .with_installments(NonZeroU32::MIN);

        assert_eq!(config.shipping().base(), Money::from_minor(18_90, BRL));
        assert_eq!(
            config.shipping().free_threshold(),
            Some(Money::from_minor(20_000, BRL))
        );
        assert_eq!(config.installments().get(), 1);
    }
}
