use rust_decimal::Decimal;

use storefront::model::{CouponDiscountModel, CouponRejectReason};

use super::{ut_default_coupon, ut_now};
use crate::ut_time;

#[test]
fn percentage_discount_basic() {
    let c = ut_default_coupon(ut_now());
    let discount = c.discount_amount(Decimal::from(1000u32));
    assert_eq!(discount, Decimal::from(100u32));
}

#[test]
fn percentage_discount_rounds_to_currency_unit() {
    let d = CouponDiscountModel::Percentage(Decimal::from(5u32));
    // 5% of 999 is 49.95, charged amounts stay whole rupees
    assert_eq!(d.amount_off(Decimal::from(999u32)), Decimal::from(50u32));
    // 5% of 990 is 49.5, rounds away from zero
    assert_eq!(d.amount_off(Decimal::from(990u32)), Decimal::from(50u32));
    assert_eq!(d.amount_off(Decimal::from(980u32)), Decimal::from(49u32));
}

#[test]
fn fixed_discount_never_exceeds_subtotal() {
    let d = CouponDiscountModel::Fixed(Decimal::from(150u32));
    assert_eq!(d.amount_off(Decimal::from(100u32)), Decimal::from(100u32));
    assert_eq!(d.amount_off(Decimal::from(500u32)), Decimal::from(150u32));
}

#[test]
fn percentage_discount_never_exceeds_subtotal() {
    let d = CouponDiscountModel::Percentage(Decimal::from(100u32));
    let subtotal = Decimal::from(730u32);
    assert!(d.amount_off(subtotal) <= subtotal);
}

#[test]
fn discount_parts_validation() {
    let result = CouponDiscountModel::try_from_parts("percentage", Decimal::from(101u32));
    assert!(result.is_err());
    let result = CouponDiscountModel::try_from_parts("fixed", Decimal::from(-3i32));
    assert!(result.is_err());
    let result = CouponDiscountModel::try_from_parts("lucky-draw", Decimal::from(5u32));
    assert!(result.is_err());
    let result = CouponDiscountModel::try_from_parts("fixed", Decimal::from(80u32));
    assert!(result.is_ok());
}

#[test]
fn applicability_inactive() {
    let mut c = ut_default_coupon(ut_now());
    c.is_active = false;
    let result = c.verify_applicable(Decimal::from(1000u32), ut_now());
    assert_eq!(result.unwrap_err(), CouponRejectReason::Inactive);
}

#[test]
fn applicability_expired() {
    let mut c = ut_default_coupon(ut_now());
    c.expiration_date = Some(ut_time("2024-05-01T00:00:00+05:30"));
    let result = c.verify_applicable(Decimal::from(1000u32), ut_now());
    assert_eq!(result.unwrap_err(), CouponRejectReason::Expired);
    // not yet expired
    c.expiration_date = Some(ut_time("2024-06-01T00:00:00+05:30"));
    let result = c.verify_applicable(Decimal::from(1000u32), ut_now());
    assert!(result.is_ok());
}

#[test]
fn applicability_below_minimum() {
    let mut c = ut_default_coupon(ut_now());
    c.min_order_value = Decimal::from(750u32);
    let result = c.verify_applicable(Decimal::from(749u32), ut_now());
    assert_eq!(result.unwrap_err(), CouponRejectReason::BelowMinimum);
    let result = c.verify_applicable(Decimal::from(750u32), ut_now());
    assert!(result.is_ok());
}

#[test]
fn applicability_usage_exhausted() {
    let mut c = ut_default_coupon(ut_now());
    c.usage_limit = Some(4);
    c.used_count = 3;
    let result = c.verify_applicable(Decimal::from(1000u32), ut_now());
    assert!(result.is_ok());
    // a coupon at its limit must be rejected
    c.used_count = 4;
    let result = c.verify_applicable(Decimal::from(1000u32), ut_now());
    assert_eq!(result.unwrap_err(), CouponRejectReason::UsageExhausted);
}
