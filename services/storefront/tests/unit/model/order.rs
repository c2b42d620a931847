use std::str::FromStr;

use rust_decimal::Decimal;

use storefront::model::{OrderLineModel, OrderModel, OrderStatus, PaymentMethod};

use super::{ut_default_order, ut_now};

#[test]
fn amount_verification() {
    let mut o = ut_default_order(1000, ut_now());
    o.lines.push(OrderLineModel {
        product_id: None,
        name: "Jaggery block".to_string(),
        unit_price: Decimal::from(120u32),
        quantity: 2,
        image: None,
    });
    // 1000 + 240 lines, flat shipping 50, coupon cut 100
    o.shipping_fee = Decimal::from(50u32);
    o.discount = Decimal::from(100u32);
    o.amount = Decimal::from(1190u32);
    assert!(o.verify_amount().is_ok());
    o.amount = Decimal::from(1200u32);
    assert!(o.verify_amount().is_err());
}

#[test]
fn lines_subtotal_sums_quantity() {
    let mut o = ut_default_order(250, ut_now());
    o.lines[0].quantity = 3;
    assert_eq!(o.lines_subtotal(), Decimal::from(750u32));
}

#[test]
fn order_id_shape() {
    let id = OrderModel::generate_order_id();
    assert!(id.starts_with("VO-"));
    let serial = id.strip_prefix("VO-").unwrap();
    assert_eq!(serial.len(), 5);
    assert!(serial.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn status_labels_roundtrip() {
    let cases = [
        (OrderStatus::Processing, "Processing"),
        (OrderStatus::Shipped, "Shipped"),
        (OrderStatus::OutForDelivery, "Out for Delivery"),
        (OrderStatus::Delivered, "Delivered"),
        (OrderStatus::Cancelled, "Cancelled"),
    ];
    for (status, label) in cases {
        assert_eq!(status.as_str(), label);
        assert_eq!(OrderStatus::from_str(label).unwrap(), status);
    }
    assert!(OrderStatus::from_str("Returned").is_err());
}

#[test]
fn payment_method_labels() {
    assert_eq!(PaymentMethod::from_str("cod").unwrap(), PaymentMethod::CashOnDelivery);
    assert_eq!(PaymentMethod::from_str("online").unwrap(), PaymentMethod::Online);
    assert!(PaymentMethod::from_str("barter").is_err());
}
