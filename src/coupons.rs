//! Coupons
//!
//! A static table of recognised codes and the outcome of applying a code to
//! a subtotal. Unrecognised or blank codes are rejections, not errors.

use std::fmt;

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use tracing::{debug, info, warn};

use crate::pricing::{PricingError, ensure_same_currency, percent_of, zero};

/// A normalised coupon code: trimmed and upper-cased, never blank.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalise a user-entered code.
    ///
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    /// Returns the normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a recognised coupon does to the cart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CouponEffect<'a> {
    /// Take a percentage off the subtotal (e.g., "10% off")
    PercentageOff(Percentage),

    /// Take a fixed amount off the subtotal (e.g., "R$20 off")
    AmountOff(Money<'a, Currency>),

    /// Waive the shipping charge
    FreeShipping,
}

/// A recognised coupon.
#[derive(Clone, Debug, PartialEq)]
pub struct Coupon<'a> {
    code: CouponCode,
    name: String,
    effect: CouponEffect<'a>,
}

impl<'a> Coupon<'a> {
    /// Create a new coupon.
    pub fn new(code: CouponCode, name: impl Into<String>, effect: CouponEffect<'a>) -> Self {
        Self {
            code,
            name: name.into(),
            effect,
        }
    }

    /// Normalised code
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effect on the cart
    pub fn effect(&self) -> &CouponEffect<'a> {
        &self.effect
    }

    /// Whether the coupon waives shipping.
    pub fn waives_shipping(&self) -> bool {
        matches!(self.effect, CouponEffect::FreeShipping)
    }

    /// Calculate the discount this coupon grants on `subtotal`.
    ///
    /// Fixed amounts are returned as configured; the total floor absorbs any excess.
    ///
    /// # Errors
    ///
    /// - [`PricingError::PercentConversion`]: the percentage cannot be represented.
    /// - [`PricingError::Money`]: a fixed amount is in another currency.
    pub fn discount_on(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        match &self.effect {
            CouponEffect::PercentageOff(pct) => percent_of(pct, subtotal),
            CouponEffect::AmountOff(amount) => {
                ensure_same_currency(subtotal, amount)?;

                Ok(*amount)
            }
            CouponEffect::FreeShipping => Ok(zero(subtotal.currency())),
        }
    }
}

/// Why a code was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionReason {
    /// The code was empty or whitespace.
    Blank,

    /// The code is not in the coupon table.
    Unrecognized,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::Blank => f.write_str("no coupon code entered"),
            RejectionReason::Unrecognized => f.write_str("coupon code not recognised"),
        }
    }
}

/// A successfully applied coupon.
#[derive(Clone, Debug, PartialEq)]
pub struct CouponApplication<'a> {
    /// The coupon that matched
    pub coupon: Coupon<'a>,

    /// Reduction of the subtotal
    pub discount: Money<'a, Currency>,

    /// Whether shipping must be forced to zero
    pub free_shipping: bool,
}

/// Result of looking up a code against a subtotal.
#[derive(Clone, Debug, PartialEq)]
pub enum CouponOutcome<'a> {
    /// The code matched a coupon.
    Applied(CouponApplication<'a>),

    /// The code had no effect; the caller keeps its prior state.
    Rejected {
        /// The code as entered
        code: String,

        /// Why it was rejected
        reason: RejectionReason,
    },
}

impl<'a> CouponOutcome<'a> {
    /// Whether the coupon was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, CouponOutcome::Applied(_))
    }

    /// The applied coupon, if any.
    pub fn application(&self) -> Option<&CouponApplication<'a>> {
        match self {
            CouponOutcome::Applied(application) => Some(application),
            CouponOutcome::Rejected { .. } => None,
        }
    }
}

/// Table of recognised coupons keyed by normalised code.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CouponTable<'a> {
    coupons: FxHashMap<CouponCode, Coupon<'a>>,
}

impl<'a> CouponTable<'a> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The storefront's default coupons.
    pub fn storefront() -> Self {
        let mut table = Self::new();

        for (code, name, effect) in [
            (
                "SAN10",
                "10% off",
                CouponEffect::PercentageOff(Percentage::from(0.10)),
            ),
            (
                "DESCONTO10",
                "10% off",
                CouponEffect::PercentageOff(Percentage::from(0.10)),
            ),
            ("FRETEGRATIS", "Free shipping", CouponEffect::FreeShipping),
        ] {
            if let Some(code) = CouponCode::parse(code) {
                table.insert(Coupon::new(code, name, effect));
            }
        }

        table
    }

    /// Add or replace a coupon.
    pub fn insert(&mut self, coupon: Coupon<'a>) -> Option<Coupon<'a>> {
        self.coupons.insert(coupon.code().clone(), coupon)
    }

    /// Look up a coupon by user-entered code (case-insensitive, trimmed).
    pub fn get(&self, raw: &str) -> Option<&Coupon<'a>> {
        let code = CouponCode::parse(raw)?;

        self.coupons.get(&code)
    }

    /// Number of coupons
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Iterate over coupons in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon<'a>> {
        let mut coupons: Vec<&Coupon<'a>> = self.coupons.values().collect();
        coupons.sort_by(|a, b| a.code().cmp(b.code()));
        coupons.into_iter()
    }
}

/// Looks up `code` in `table` and derives its effect on `subtotal`.
///
/// # Errors
///
/// Returns a [`PricingError`] only if a recognised coupon's discount cannot be
/// calculated. Unknown or blank codes are [`CouponOutcome::Rejected`].
pub fn apply_coupon<'a>(
    table: &CouponTable<'a>,
    code: &str,
    subtotal: &Money<'a, Currency>,
) -> Result<CouponOutcome<'a>, PricingError> {
    if CouponCode::parse(code).is_none() {
        return Ok(rejected(code, RejectionReason::Blank));
    }

    let Some(coupon) = table.get(code) else {
        return Ok(rejected(code, RejectionReason::Unrecognized));
    };

    let discount = coupon.discount_on(subtotal)?;

    debug!(code = %coupon.code(), %discount, "coupon matched");

    Ok(CouponOutcome::Applied(CouponApplication {
        free_shipping: coupon.waives_shipping(),
        coupon: coupon.clone(),
        discount,
    }))
}

fn rejected<'a>(code: &str, reason: RejectionReason) -> CouponOutcome<'a> {
    CouponOutcome::Rejected {
        code: code.to_string(),
        reason,
    }
}

/// Holds at most one active coupon.
///
/// Applying a recognised code replaces the active coupon; a rejected code
/// leaves it untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CouponSlot<'a> {
    active: Option<Coupon<'a>>,
}

impl<'a> CouponSlot<'a> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active coupon, if any.
    pub fn active(&self) -> Option<&Coupon<'a>> {
        self.active.as_ref()
    }

    /// Apply `code` against `subtotal`, activating the coupon if it is recognised.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a recognised coupon's discount cannot be calculated;
    /// the active coupon is left unchanged in that case.
    pub fn apply(
        &mut self,
        table: &CouponTable<'a>,
        code: &str,
        subtotal: &Money<'a, Currency>,
    ) -> Result<CouponOutcome<'a>, PricingError> {
        let outcome = apply_coupon(table, code, subtotal)?;

        match &outcome {
            CouponOutcome::Applied(application) => {
                if let Some(previous) = &self.active {
                    info!(
                        previous = %previous.code(),
                        code = %application.coupon.code(),
                        "replacing active coupon"
                    );
                } else {
                    info!(code = %application.coupon.code(), "coupon applied");
                }

                self.active = Some(application.coupon.clone());
            }
            CouponOutcome::Rejected { code, reason } => {
                warn!(code = %code, %reason, "coupon rejected");
            }
        }

        Ok(outcome)
    }

    /// Remove the active coupon.
    pub fn clear(&mut self) -> Option<Coupon<'a>> {
        self.active.take()
    }
}
