use std::boxed::Box;
use std::sync::Arc;

use rust_decimal::Decimal;

use storefront::api::web::dto::{CustomerContactDto, OrderCreateReqDto, OrderItemDto};
use storefront::datastore::AbstInMemoryDStore;
use storefront::model::CouponRejectReason;
use storefront::repository::{
    AbsCouponRepo, AbsOrderRepo, AbsPartnerRepo, ContentInMemRepo, CouponInMemRepo,
    OrderInMemRepo, PartnerInMemRepo,
};
use storefront::usecase::{PlaceOrderUcError, PlaceOrderUseCase};

use super::MockMailGateway;
use crate::model::{ut_default_coupon, ut_default_partner, ut_now};
use crate::{ut_log_context, ut_setup_dstore};

async fn ut_usecase(ds: Arc<Box<dyn AbstInMemoryDStore>>) -> PlaceOrderUseCase {
    PlaceOrderUseCase {
        repo_order: Box::new(OrderInMemRepo::new(ds.clone()).await.unwrap()),
        repo_coupon: Box::new(CouponInMemRepo::new(ds.clone()).await.unwrap()),
        repo_partner: Box::new(PartnerInMemRepo::new(ds.clone()).await.unwrap()),
        repo_content: Box::new(ContentInMemRepo::new(ds).await.unwrap()),
        mail_gateway: MockMailGateway::new(),
        logctx: ut_log_context(),
    }
}

fn ut_request(amount: u32) -> OrderCreateReqDto {
    OrderCreateReqDto {
        customer: CustomerContactDto {
            name: "Asha Rao".to_string(),
            email: "asha@buyer.example".to_string(),
            phone: "+919988776655".to_string(),
            address: "12 Lake View Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            pincode: "411001".to_string(),
        },
        items: vec![OrderItemDto {
            id: Some("prod-01".to_string()),
            name: "Cold-pressed groundnut oil".to_string(),
            price: Decimal::from(500u32),
            quantity: 2,
            image: None,
        }],
        amount: Decimal::from(amount),
        payment_method: "online".to_string(),
        transaction_id: None,
        coupon_code: None,
        partner_code: None,
    }
}

#[tokio::test]
async fn checkout_plain_ok() {
    let ds = ut_setup_dstore(128);
    let uc = ut_usecase(ds.clone()).await;
    // subtotal 1000, above the free-shipping threshold, no extra fee
    let resp = uc.execute(ut_request(1000), ut_now()).await.ok().unwrap();
    assert!(resp.order_id.starts_with("VO-"));
    assert_eq!(resp.status.as_str(), "Processing");
    let o_repo = OrderInMemRepo::new(ds).await.unwrap();
    let stored = o_repo
        .fetch_by_id(resp.order_id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.amount, Decimal::from(1000u32));
    assert_eq!(stored.shipping_fee, Decimal::ZERO);
}

#[tokio::test]
async fn checkout_flat_shipping_below_threshold() {
    let ds = ut_setup_dstore(128);
    let uc = ut_usecase(ds.clone()).await;
    let mut req = ut_request(350);
    req.items[0].price = Decimal::from(300u32);
    req.items[0].quantity = 1;
    // 300 subtotal + 50 default flat shipping
    let resp = uc.execute(req, ut_now()).await.ok().unwrap();
    let o_repo = OrderInMemRepo::new(ds).await.unwrap();
    let stored = o_repo
        .fetch_by_id(resp.order_id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.shipping_fee, Decimal::from(50u32));
}

#[tokio::test]
async fn checkout_amount_mismatch_rejected() {
    let ds = ut_setup_dstore(128);
    let uc = ut_usecase(ds).await;
    let result = uc.execute(ut_request(990), ut_now()).await;
    assert!(matches!(result, Err(PlaceOrderUcError::ReqContent(_))));
}

#[tokio::test]
async fn checkout_with_coupon_applies_discount() {
    let ds = ut_setup_dstore(128);
    let c_repo = CouponInMemRepo::new(ds.clone()).await.unwrap();
    c_repo.create(ut_default_coupon(ut_now())).await.unwrap();
    let uc = ut_usecase(ds.clone()).await;
    let mut req = ut_request(900);
    // subtotal 1000, SAVE10 cuts 100, free shipping above threshold
    req.coupon_code = Some("save10".to_string());
    let resp = uc.execute(req, ut_now()).await.ok().unwrap();
    let o_repo = OrderInMemRepo::new(ds.clone()).await.unwrap();
    let stored = o_repo
        .fetch_by_id(resp.order_id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.discount, Decimal::from(100u32));
    assert_eq!(stored.coupon_code.as_deref(), Some("SAVE10"));
    let coupon = c_repo.fetch_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(coupon.used_count, 1);
}

#[tokio::test]
async fn checkout_coupon_exhausted_rejected() {
    let ds = ut_setup_dstore(128);
    let c_repo = CouponInMemRepo::new(ds.clone()).await.unwrap();
    let mut coupon = ut_default_coupon(ut_now());
    coupon.usage_limit = Some(1);
    coupon.used_count = 1;
    c_repo.create(coupon).await.unwrap();
    let uc = ut_usecase(ds).await;
    let mut req = ut_request(900);
    req.coupon_code = Some("SAVE10".to_string());
    let result = uc.execute(req, ut_now()).await;
    assert!(matches!(
        result,
        Err(PlaceOrderUcError::CouponRejected(
            CouponRejectReason::UsageExhausted
        ))
    ));
}

#[tokio::test]
async fn checkout_unknown_coupon_rejected() {
    let ds = ut_setup_dstore(128);
    let uc = ut_usecase(ds).await;
    let mut req = ut_request(1000);
    req.coupon_code = Some("GHOST".to_string());
    let result = uc.execute(req, ut_now()).await;
    assert!(matches!(
        result,
        Err(PlaceOrderUcError::CouponRejected(CouponRejectReason::NotFound))
    ));
}

#[tokio::test]
async fn checkout_with_referral_accrues_commission() {
    let ds = ut_setup_dstore(128);
    let p_repo = PartnerInMemRepo::new(ds.clone()).await.unwrap();
    p_repo.create(ut_default_partner(ut_now())).await.unwrap();
    let uc = ut_usecase(ds.clone()).await;
    let mut req = ut_request(1000);
    req.partner_code = Some("GREENV".to_string());
    let resp = uc.execute(req, ut_now()).await.ok().unwrap();

    // 5 percent of 1000
    let partner = p_repo.fetch_by_code("GREENV").await.unwrap().unwrap();
    assert_eq!(partner.total_orders, 1);
    assert_eq!(partner.total_sales, Decimal::from(1000u32));
    assert_eq!(partner.total_commission, Decimal::from(50u32));

    let o_repo = OrderInMemRepo::new(ds).await.unwrap();
    let stored = o_repo
        .fetch_by_id(resp.order_id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.partner_code.as_deref(), Some("GREENV"));
    assert_eq!(stored.partner_commission, Some(Decimal::from(50u32)));
}

#[tokio::test]
async fn checkout_suspended_partner_skips_commission() {
    let ds = ut_setup_dstore(128);
    let p_repo = PartnerInMemRepo::new(ds.clone()).await.unwrap();
    let mut partner = ut_default_partner(ut_now());
    partner.is_active = false;
    p_repo.create(partner).await.unwrap();
    let uc = ut_usecase(ds).await;
    let mut req = ut_request(1000);
    req.partner_code = Some("GREENV".to_string());
    let _resp = uc.execute(req, ut_now()).await.ok().unwrap();
    let partner = p_repo.fetch_by_code("GREENV").await.unwrap().unwrap();
    assert_eq!(partner.total_orders, 0);
    assert_eq!(partner.total_commission, Decimal::ZERO);
}

#[tokio::test]
async fn checkout_empty_items_rejected() {
    let ds = ut_setup_dstore(128);
    let uc = ut_usecase(ds).await;
    let mut req = ut_request(0);
    req.items.clear();
    let result = uc.execute(req, ut_now()).await;
    assert!(matches!(result, Err(PlaceOrderUcError::ReqContent(_))));
}

#[tokio::test]
async fn checkout_missing_customer_field_rejected() {
    let ds = ut_setup_dstore(128);
    let uc = ut_usecase(ds).await;
    let mut req = ut_request(1000);
    req.customer.pincode = "".to_string();
    let result = uc.execute(req, ut_now()).await;
    assert!(matches!(result, Err(PlaceOrderUcError::ReqContent(_))));
}
