//! Cart Pricing
//!
//! Pricing for a storefront shopping cart: subtotals, coupon discounts, free-shipping rules,
//! totals and interest-free installment breakdowns, all calculated in minor currency units.

pub mod cart;
pub mod config;
pub mod coupons;
pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod shipping;
pub mod summary;
