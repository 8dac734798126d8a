//! Pricing Configuration Fixtures

use std::num::NonZeroU32;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    config::{DEFAULT_INSTALLMENTS, PricingConfig},
    coupons::{Coupon, CouponCode, CouponEffect, CouponTable},
    fixtures::{FixtureError, items::parse_price},
    shipping::ShippingPolicy,
};

/// Pricing configuration from YAML
#[derive(Debug, Deserialize)]
pub struct PricingFixture {
    /// Shipping charges
    pub shipping: ShippingFixture,

    /// Number of installments to display
    #[serde(default = "default_installments")]
    pub installments: u32,

    /// Map of coupon code -> coupon fixture
    #[serde(default)]
    pub coupons: FxHashMap<String, CouponFixture>,
}

fn default_installments() -> u32 {
    DEFAULT_INSTALLMENTS.get()
}

/// Shipping configuration from YAML
#[derive(Debug, Deserialize)]
pub struct ShippingFixture {
    /// Base charge (e.g., "15.90 BRL")
    pub base: String,

    /// Subtotal from which shipping is free (e.g., "200.00 BRL")
    #[serde(default)]
    pub free_threshold: Option<String>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponFixture {
    /// Percentage off the subtotal
    PercentageOff {
        /// Coupon name
        name: String,

        /// Percentage (e.g., "10%" or "0.10")
        value: String,
    },

    /// Fixed amount off the subtotal
    AmountOff {
        /// Coupon name
        name: String,

        /// Amount (e.g., "20.00 BRL")
        value: String,
    },

    /// Free shipping
    FreeShipping {
        /// Coupon name
        name: String,
    },
}

impl CouponFixture {
    /// Convert to a `Coupon` for the given code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is blank or the coupon value is invalid.
    pub fn try_into_coupon(
        self,
        code: &str,
        currency: &'static Currency,
    ) -> Result<Coupon<'static>, FixtureError> {
        let coupon_code =
            CouponCode::parse(code).ok_or_else(|| FixtureError::InvalidCoupon(code.to_string()))?;

        let (name, effect) = match self {
            CouponFixture::PercentageOff { name, value } => {
                (name, CouponEffect::PercentageOff(parse_percentage(&value)?))
            }
            CouponFixture::AmountOff { name, value } => {
                let (minor_units, amount_currency) = parse_price(&value)?;

                if amount_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        amount_currency.iso_alpha_code.to_string(),
                    ));
                }

                (
                    name,
                    CouponEffect::AmountOff(Money::from_minor(minor_units, currency)),
                )
            }
            CouponFixture::FreeShipping { name } => (name, CouponEffect::FreeShipping),
        };

        Ok(Coupon::new(coupon_code, name, effect))
    }
}

impl TryFrom<PricingFixture> for PricingConfig<'static> {
    type Error = FixtureError;

    fn try_from(fixture: PricingFixture) -> Result<Self, Self::Error> {
        let (base_minor, currency) = parse_price(&fixture.shipping.base)?;
        let base = Money::from_minor(base_minor, currency);

        let free_threshold = fixture
            .shipping
            .free_threshold
            .as_deref()
            .map(parse_price)
            .transpose()?
            .map(|(minor_units, threshold_currency)| {
                if threshold_currency == currency {
                    Ok(Money::from_minor(minor_units, currency))
                } else {
                    Err(FixtureError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        threshold_currency.iso_alpha_code.to_string(),
                    ))
                }
            })
            .transpose()?;

        let mut coupons = CouponTable::new();

        for (code, coupon_fixture) in fixture.coupons {
            let coupon = coupon_fixture.try_into_coupon(&code, currency)?;

            if coupons.insert(coupon).is_some() {
                return Err(FixtureError::InvalidCoupon(format!(
                    "duplicate coupon code: {code}"
                )));
            }
        }

        let installments =
            NonZeroU32::new(fixture.installments).ok_or(FixtureError::InvalidInstallments)?;

        Ok(PricingConfig::new(
            ShippingPolicy::new(base, free_threshold)?,
            coupons,
            installments,
        ))
    }
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or is outside `0%..=100%`.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))?
    } else {
        trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
    };

    if fraction.is_sign_negative() || fraction > Decimal::ONE {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}
