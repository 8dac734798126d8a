//! Cart Pricing CLI
//!
//! Loads a cart and pricing fixture set, applies any coupons given with `-c`
//! and prints the priced receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to apply a coupon code (repeatable, applied in order)
//! Use `-s` to override the base shipping charge

use std::io::{self, Write};

use anyhow::{Result, ensure};
use clap::Parser;
use rusty_money::Money;
use tracing::info;

use cart_pricing::{
    coupons::CouponOutcome,
    fixtures::{Fixture, items::parse_price},
    receipt::Receipt,
    summary::CartPricer,
};

use crate::config::CliConfig;

mod config;
mod logging;

/// Cart Pricing entry point
pub fn main() -> Result<()> {
    let config = CliConfig::parse();

    logging::init_subscriber(&config.logging)?;

    let mut fixture = Fixture::with_base_path(&config.fixtures_dir);
    fixture
        .load_pricing(&config.fixture)?
        .load_cart(&config.fixture)?;

    let cart = fixture.cart()?;
    let mut pricing = fixture.pricing()?.clone();

    if let Some(shipping) = config.shipping.as_deref() {
        let (minor_units, currency) = parse_price(shipping)?;

        ensure!(
            currency == pricing.currency(),
            "shipping override must be in {}, got {}",
            pricing.currency().iso_alpha_code,
            currency.iso_alpha_code
        );

        pricing = pricing.with_shipping_base(Money::from_minor(minor_units, currency));
    }

    info!(
        fixture = %config.fixture,
        lines = cart.len(),
        units = cart.unit_count(),
        "cart loaded"
    );

    let shipping_base = pricing.shipping().base();
    let mut pricer = CartPricer::new(pricing);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for code in &config.coupons {
        match pricer.apply_coupon(&cart, code)? {
            CouponOutcome::Applied(application) => writeln!(
                handle,
                "Coupon {} applied: {}",
                application.coupon.code(),
                application.coupon.name()
            )?,
            CouponOutcome::Rejected { code, reason } => {
                writeln!(handle, "Coupon {code:?} rejected: {reason}")?;
            }
        }
    }

    let summary = pricer.summarize(&cart)?;

    Receipt::from_summary(&cart, summary, shipping_base)?.write_to(&mut handle)?;

    Ok(())
}
