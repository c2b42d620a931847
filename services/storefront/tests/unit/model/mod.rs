mod content;
mod coupon;
mod order;
mod partner;
mod payout;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use storefront::model::{
    CommissionPolicyModel, ContactSnapshotModel, CouponDiscountModel, CouponModel, OrderLineModel,
    OrderModel, OrderStatus, PartnerModel, PaymentMethod,
};

use super::ut_time;

pub(crate) fn ut_default_coupon(created_at: DateTime<FixedOffset>) -> CouponModel {
    CouponModel {
        id: "c-beef0001".to_string(),
        code: "SAVE10".to_string(),
        discount: CouponDiscountModel::Percentage(Decimal::from(10u32)),
        min_order_value: Decimal::ZERO,
        expiration_date: None,
        usage_limit: None,
        used_count: 0,
        is_active: true,
        sent_to: None,
        created_at,
    }
}

pub(crate) fn ut_default_partner(created_at: DateTime<FixedOffset>) -> PartnerModel {
    PartnerModel {
        id: "p-beef0001".to_string(),
        name: "Green Valley Farms".to_string(),
        email: "contact@greenvalley.example".to_string(),
        phone: Some("+911234567890".to_string()),
        partner_code: "GREENV".to_string(),
        commission: CommissionPolicyModel::Percentage(Decimal::from(5u32)),
        is_active: true,
        has_access: true,
        password_hash: None,
        login_count: 0,
        last_login_at: None,
        payout_details: None,
        logo: None,
        description: None,
        website: None,
        total_orders: 0,
        total_sales: Decimal::ZERO,
        total_commission: Decimal::ZERO,
        created_at,
    }
}

pub(crate) fn ut_default_order(amount: u32, created_at: DateTime<FixedOffset>) -> OrderModel {
    OrderModel {
        order_id: "VO-10001".to_string(),
        customer: ContactSnapshotModel {
            name: "Asha Rao".to_string(),
            email: "asha@buyer.example".to_string(),
            phone: "+919988776655".to_string(),
            address: "12 Lake View Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            pincode: "411001".to_string(),
        },
        lines: vec![OrderLineModel {
            product_id: Some("prod-01".to_string()),
            name: "Cold-pressed groundnut oil".to_string(),
            unit_price: Decimal::from(amount),
            quantity: 1,
            image: None,
        }],
        amount: Decimal::from(amount),
        shipping_fee: Decimal::ZERO,
        discount: Decimal::ZERO,
        coupon_code: None,
        partner_code: None,
        partner_commission: None,
        payment_method: PaymentMethod::Online,
        transaction_id: None,
        status: OrderStatus::Processing,
        tracking_number: None,
        courier_name: None,
        created_at,
    }
}

pub(crate) fn ut_now() -> DateTime<FixedOffset> {
    ut_time("2024-05-15T10:30:00+05:30")
}
