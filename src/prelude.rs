//! Cart pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    config::{DEFAULT_INSTALLMENTS, PricingConfig},
    coupons::{
        Coupon, CouponApplication, CouponCode, CouponEffect, CouponOutcome, CouponSlot,
        CouponTable, RejectionReason, apply_coupon,
    },
    fixtures::{Fixture, FixtureError},
    items::{LineItem, ProductId},
    pricing::{InstallmentPlan, PricingError, compute_installments, compute_total},
    receipt::{Receipt, ReceiptError},
    shipping::{FreeShipping, FreeShippingProgress, ShippingPolicy, is_free_shipping_eligible},
    summary::{CartPricer, CartSummary},
};
