use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use storefront::model::OrderStatus;
use storefront::repository::{
    AbsOrderRepo, AbsPartnerRepo, CommissionAccrualModel, OrderInMemRepo, PartnerInMemRepo,
};

use crate::model::{ut_default_order, ut_default_partner, ut_now};
use crate::{ut_setup_dstore, ut_time};

async fn ut_repos() -> (OrderInMemRepo, PartnerInMemRepo) {
    let ds = ut_setup_dstore(64);
    let o_repo = OrderInMemRepo::new(ds.clone()).await.unwrap();
    let p_repo = PartnerInMemRepo::new(ds).await.unwrap();
    (o_repo, p_repo)
}

#[tokio::test]
async fn create_then_fetch() {
    let (repo, _p_repo) = ut_repos().await;
    let order = ut_default_order(1000, ut_now());
    repo.create(order, None).await.unwrap();
    let found = repo.fetch_by_id("VO-10001").await.unwrap().unwrap();
    assert_eq!(found.amount, Decimal::from(1000u32));
    assert_eq!(found.status, OrderStatus::Processing);
    assert_eq!(found.lines.len(), 1);
    assert_eq!(found.customer.name.as_str(), "Asha Rao");
}

#[tokio::test]
async fn create_with_accrual_updates_partner() {
    let (repo, p_repo) = ut_repos().await;
    let partner = ut_default_partner(ut_now());
    let partner_id = partner.id.clone();
    p_repo.create(partner).await.unwrap();

    let mut order = ut_default_order(1000, ut_now());
    order.partner_code = Some("GREENV".to_string());
    order.partner_commission = Some(Decimal::from(50u32));
    let accrual = CommissionAccrualModel {
        partner_id: partner_id.clone(),
        order_amount: Decimal::from(1000u32),
        commission: Decimal::from(50u32),
    };
    repo.create(order, Some(accrual)).await.unwrap();

    let p = p_repo.fetch(partner_id.as_str()).await.unwrap().unwrap();
    assert_eq!(p.total_orders, 1);
    assert_eq!(p.total_sales, Decimal::from(1000u32));
    assert_eq!(p.total_commission, Decimal::from(50u32));
}

#[tokio::test]
async fn create_with_accrual_unknown_partner_saves_nothing() {
    let (repo, _p_repo) = ut_repos().await;
    let order = ut_default_order(1000, ut_now());
    let accrual = CommissionAccrualModel {
        partner_id: "p-ghost".to_string(),
        order_amount: Decimal::from(1000u32),
        commission: Decimal::from(50u32),
    };
    let e = repo.create(order, Some(accrual)).await.unwrap_err();
    assert_eq!(e.code, AppErrorCode::ObjectNotExist);
    // the order write must have been rolled up with the failed accrual
    assert!(repo.fetch_by_id("VO-10001").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_order_id_rejected() {
    let (repo, _p_repo) = ut_repos().await;
    let order = ut_default_order(1000, ut_now());
    repo.create(order, None).await.unwrap();
    let again = ut_default_order(750, ut_now());
    let e = repo.create(again, None).await.unwrap_err();
    assert_eq!(e.code, AppErrorCode::DuplicateKeyExists);
}

#[tokio::test]
async fn update_fulfillment_fields() {
    let (repo, _p_repo) = ut_repos().await;
    let order = ut_default_order(1000, ut_now());
    repo.create(order, None).await.unwrap();
    let updated = repo
        .update_fulfillment(
            "VO-10001",
            Some(OrderStatus::Shipped),
            Some("TRK-778899".to_string()),
            Some("BlueDart".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(updated.tracking_number.as_deref(), Some("TRK-778899"));
    assert_eq!(updated.courier_name.as_deref(), Some("BlueDart"));
    // partial update leaves other fields alone
    let updated = repo
        .update_fulfillment("VO-10001", Some(OrderStatus::Delivered), None, None)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Delivered);
    assert_eq!(updated.tracking_number.as_deref(), Some("TRK-778899"));
}

#[tokio::test]
async fn update_fulfillment_missing_order() {
    let (repo, _p_repo) = ut_repos().await;
    let e = repo
        .update_fulfillment("VO-99999", Some(OrderStatus::Shipped), None, None)
        .await
        .unwrap_err();
    assert_eq!(e.code, AppErrorCode::ObjectNotExist);
}

#[tokio::test]
async fn fetch_by_partner_code_with_since() {
    let (repo, _p_repo) = ut_repos().await;
    let mut o1 = ut_default_order(500, ut_time("2024-04-01T10:00:00+05:30"));
    o1.order_id = "VO-20001".to_string();
    o1.partner_code = Some("GREENV".to_string());
    let mut o2 = ut_default_order(700, ut_time("2024-05-02T10:00:00+05:30"));
    o2.order_id = "VO-20002".to_string();
    o2.partner_code = Some("GREENV".to_string());
    let mut o3 = ut_default_order(900, ut_time("2024-05-03T10:00:00+05:30"));
    o3.order_id = "VO-20003".to_string();
    repo.create(o1, None).await.unwrap();
    repo.create(o2, None).await.unwrap();
    repo.create(o3, None).await.unwrap();

    let referred = repo.fetch_by_partner_code("GREENV", None).await.unwrap();
    assert_eq!(referred.len(), 2);
    assert_eq!(referred[0].order_id.as_str(), "VO-20002");
    let since = ut_time("2024-05-01T00:00:00+05:30");
    let recent = repo
        .fetch_by_partner_code("GREENV", Some(since))
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].order_id.as_str(), "VO-20002");
}
