//! Cart summary tests against the `example` fixture set.

use rusty_money::{Money, iso::BRL};
use testresult::TestResult;

use cart_pricing::{
    cart::change_quantity,
    coupons::{CouponOutcome, RejectionReason},
    fixtures::Fixture,
    items::{LineItem, ProductId},
    pricing::compute_installments,
    shipping::is_free_shipping_eligible,
    summary::CartPricer,
};

fn brl<'a>(minor: i64) -> Money<'a, rusty_money::iso::Currency> {
    Money::from_minor(minor, BRL)
}

fn example() -> TestResult<(Fixture, CartPricer<'static>)> {
    let fixture = Fixture::from_set("example")?;
    let pricer = CartPricer::new(fixture.pricing()?.clone());

    Ok((fixture, pricer))
}

#[test]
fn subtotal_sums_line_totals() -> TestResult {
    let (fixture, pricer) = example()?;

    let summary = pricer.summarize(&fixture.cart()?)?;

    assert_eq!(summary.subtotal, brl(25_000));
    assert_eq!(summary.discount, brl(0));
    assert_eq!(summary.shipping, brl(0));
    assert_eq!(summary.total, brl(25_000));

    Ok(())
}

#[test]
fn subtotal_is_invariant_under_reordering() -> TestResult {
    let (fixture, pricer) = example()?;

    let cart = fixture.cart()?;
    let mut reversed: Vec<LineItem<'static>> = cart.items().to_vec();
    reversed.reverse();

    let reordered = cart_pricing::cart::Cart::with_items(reversed, BRL)?;

    assert_eq!(
        pricer.summarize(&cart)?.subtotal,
        pricer.summarize(&reordered)?.subtotal
    );

    Ok(())
}

#[test]
fn percentage_coupon_discounts_subtotal() -> TestResult {
    let (fixture, mut pricer) = example()?;
    let cart = fixture.cart()?;

    let outcome = pricer.apply_coupon(&cart, "SAN10")?;
    let application = outcome.application().ok_or("expected SAN10 to apply")?;

    assert_eq!(application.discount, brl(25_00));
    assert!(!application.free_shipping);

    let summary = pricer.summarize(&cart)?;

    assert_eq!(summary.discount, brl(25_00));
    assert_eq!(summary.total, brl(22_500));
    assert_eq!(summary.installments.amount(), brl(22_50));
    assert_eq!(summary.installments.count().get(), 10);

    Ok(())
}

#[test]
fn amount_coupon_discounts_subtotal() -> TestResult {
    let (fixture, mut pricer) = example()?;
    let cart = fixture.cart()?;

    pricer.apply_coupon(&cart, "vinte")?;

    let summary = pricer.summarize(&cart)?;

    assert_eq!(summary.discount, brl(20_00));
    assert_eq!(summary.total, brl(23_000));

    Ok(())
}

#[test]
fn amount_coupon_larger_than_subtotal_floors_total_at_zero() -> TestResult {
    let (fixture, mut pricer) = example()?;
    let cart = fixture
        .cart()?
        .cleared()
        .with_item(LineItem::try_new("sticker", brl(5_00), 1).ok_or("zero quantity")?)?;

    pricer.apply_coupon(&cart, "VINTE")?;

    let summary = pricer.summarize(&cart)?;

    assert_eq!(summary.subtotal, brl(5_00));
    assert_eq!(summary.total, brl(0));
    assert_eq!(summary.installments.amount(), brl(0));

    Ok(())
}

#[test]
fn unrecognised_coupon_leaves_summary_unchanged() -> TestResult {
    let (fixture, mut pricer) = example()?;
    let cart = fixture.cart()?;

    pricer.apply_coupon(&cart, "SAN10")?;
    let before = pricer.summarize(&cart)?;

    let outcome = pricer.apply_coupon(&cart, "BLACKFRIDAY")?;

    assert!(matches!(
        outcome,
        CouponOutcome::Rejected {
            reason: RejectionReason::Unrecognized,
            ..
        }
    ));

    let after = pricer.summarize(&cart)?;

    assert_eq!(before.subtotal, after.subtotal);
    assert_eq!(before.discount, after.discount);
    assert_eq!(before.shipping, after.shipping);

    Ok(())
}

#[test]
fn blank_coupon_is_rejected() -> TestResult {
    let (fixture, mut pricer) = example()?;
    let cart = fixture.cart()?;

    let outcome = pricer.apply_coupon(&cart, "   ")?;

    assert!(matches!(
        outcome,
        CouponOutcome::Rejected {
            reason: RejectionReason::Blank,
            ..
        }
    ));
    assert!(pricer.active_coupon().is_none());

    Ok(())
}

#[test]
fn threshold_boundary_is_inclusive() -> TestResult {
    let threshold = brl(20_000);

    assert!(is_free_shipping_eligible(&brl(25_000), &threshold)?);
    assert!(is_free_shipping_eligible(&brl(20_000), &threshold)?);
    assert!(!is_free_shipping_eligible(&brl(19_999), &threshold)?);

    Ok(())
}

#[test]
fn change_quantity_to_zero_removes_line() -> TestResult {
    let (fixture, _pricer) = example()?;
    let items = fixture.items();

    let updated = change_quantity(items, &ProductId::from("b"), 0);

    assert_eq!(updated.len(), items.len() - 1);
    assert!(updated.iter().all(|item| item.product_id().as_str() != "b"));

    let untouched = change_quantity(items, &ProductId::from("missing"), 0);

    assert_eq!(untouched, items);

    Ok(())
}

#[test]
fn installments_split_total_half_up() -> TestResult {
    let ten = std::num::NonZeroU32::new(10).ok_or("zero installments")?;

    assert_eq!(compute_installments(brl(22_500), ten)?.amount(), brl(22_50));
    assert_eq!(compute_installments(brl(0), ten)?.amount(), brl(0));
    assert_eq!(compute_installments(brl(25), ten)?.amount(), brl(3));

    Ok(())
}
