use rust_decimal::Decimal;

use storefront::model::{CommissionPolicyModel, PartnerModel};

use super::{ut_default_partner, ut_now};

#[test]
fn percentage_commission_accrual() {
    let mut p = ut_default_partner(ut_now());
    let earned = p.accrue(Decimal::from(1000u32));
    assert_eq!(earned, Decimal::from(50u32));
    assert_eq!(p.total_orders, 1u64);
    assert_eq!(p.total_sales, Decimal::from(1000u32));
    assert_eq!(p.total_commission, Decimal::from(50u32));
    let _earned = p.accrue(Decimal::from(400u32));
    assert_eq!(p.total_orders, 2u64);
    assert_eq!(p.total_sales, Decimal::from(1400u32));
    assert_eq!(p.total_commission, Decimal::from(70u32));
}

#[test]
fn fixed_commission_accrual() {
    let mut p = ut_default_partner(ut_now());
    p.commission = CommissionPolicyModel::Fixed(Decimal::from(35u32));
    let earned = p.accrue(Decimal::from(9999u32));
    assert_eq!(earned, Decimal::from(35u32));
    assert_eq!(p.total_commission, Decimal::from(35u32));
}

#[test]
fn commission_rounding() {
    let c = CommissionPolicyModel::Percentage(Decimal::from(3u32));
    // 3% of 1234 is 37.02
    assert_eq!(c.amount_for(Decimal::from(1234u32)), Decimal::from(37u32));
}

#[test]
fn commission_parts_validation() {
    assert!(CommissionPolicyModel::try_from_parts("percentage", Decimal::from(100u32)).is_ok());
    assert!(CommissionPolicyModel::try_from_parts("percentage", Decimal::from(101u32)).is_err());
    assert!(CommissionPolicyModel::try_from_parts("fixed", Decimal::from(-1i32)).is_err());
    assert!(CommissionPolicyModel::try_from_parts("tiered", Decimal::from(5u32)).is_err());
}

#[test]
fn password_roundtrip() {
    let mut p = ut_default_partner(ut_now());
    assert!(p.assign_password("tiny").is_err());
    assert!(p.password_hash.is_none());
    p.assign_password("s3cret-enough").unwrap();
    assert!(p.password_hash.is_some());
    assert!(p.verify_password("s3cret-enough").unwrap());
    assert!(!p.verify_password("wrong-password").unwrap());
}

#[test]
fn verify_password_without_hash() {
    let p = ut_default_partner(ut_now());
    assert!(p.verify_password("anything").is_err());
}

#[test]
fn code_normalization_and_length() {
    assert_eq!(PartnerModel::normalize_code(" greenv "), "GREENV");
    assert!(PartnerModel::validate_code("AB").is_err());
    assert!(PartnerModel::validate_code("ABC").is_ok());
    assert!(PartnerModel::validate_code("A".repeat(20).as_str()).is_ok());
    assert!(PartnerModel::validate_code("A".repeat(21).as_str()).is_err());
}
