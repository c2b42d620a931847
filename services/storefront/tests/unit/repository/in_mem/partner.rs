use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use storefront::model::{BankAccountModel, CommissionPolicyModel, PayoutDetailsModel};
use storefront::repository::{AbsPartnerRepo, PartnerInMemRepo};

use crate::model::{ut_default_partner, ut_now};
use crate::{ut_setup_dstore, ut_time};

async fn ut_repo() -> PartnerInMemRepo {
    let ds = ut_setup_dstore(64);
    PartnerInMemRepo::new(ds).await.unwrap()
}

#[tokio::test]
async fn create_then_fetch_by_indices() {
    let repo = ut_repo().await;
    let item = ut_default_partner(ut_now());
    repo.create(item).await.unwrap();
    let by_code = repo.fetch_by_code("greenv").await.unwrap().unwrap();
    assert_eq!(by_code.name.as_str(), "Green Valley Farms");
    let by_email = repo
        .fetch_by_email("CONTACT@GREENVALLEY.EXAMPLE")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, by_code.id);
}

#[tokio::test]
async fn create_duplicate_email_rejected() {
    let repo = ut_repo().await;
    let item = ut_default_partner(ut_now());
    repo.create(item).await.unwrap();
    let mut dup = ut_default_partner(ut_now());
    dup.id = "p-beef0002".to_string();
    dup.partner_code = "OTHERC".to_string();
    let e = repo.create(dup).await.unwrap_err();
    assert_eq!(e.code, AppErrorCode::DuplicateKeyExists);
}

#[tokio::test]
async fn record_login_increments() {
    let repo = ut_repo().await;
    let item = ut_default_partner(ut_now());
    let id = item.id.clone();
    repo.create(item).await.unwrap();
    let t1 = ut_time("2024-05-16T08:00:00+05:30");
    repo.record_login(id.as_str(), t1).await.unwrap();
    let t2 = ut_time("2024-05-17T08:00:00+05:30");
    repo.record_login(id.as_str(), t2).await.unwrap();
    let found = repo.fetch(id.as_str()).await.unwrap().unwrap();
    assert_eq!(found.login_count, 2);
    assert_eq!(found.last_login_at, Some(t2));
}

#[tokio::test]
async fn payout_details_roundtrip() {
    let repo = ut_repo().await;
    let item = ut_default_partner(ut_now());
    let id = item.id.clone();
    repo.create(item).await.unwrap();
    let details = PayoutDetailsModel {
        upi_id: Some("greenv@upi".to_string()),
        bank: Some(BankAccountModel {
            account_holder: "Green Valley Farms".to_string(),
            account_number: "0012345678".to_string(),
            ifsc_code: "HDFC0001234".to_string(),
            bank_name: "HDFC".to_string(),
        }),
    };
    repo.update_payout_details(id.as_str(), details.clone())
        .await
        .unwrap();
    let found = repo.fetch(id.as_str()).await.unwrap().unwrap();
    assert_eq!(found.payout_details, Some(details));
}

#[tokio::test]
async fn update_profile_keeps_aggregates_and_credential() {
    let repo = ut_repo().await;
    let mut item = ut_default_partner(ut_now());
    item.assign_password("s3cret-enough").unwrap();
    item.total_orders = 7;
    item.total_sales = Decimal::from(7000u32);
    item.total_commission = Decimal::from(350u32);
    let id = item.id.clone();
    repo.create(item).await.unwrap();

    let mut edited = repo.fetch(id.as_str()).await.unwrap().unwrap();
    edited.name = "Green Valley Organic Farms".to_string();
    edited.commission = CommissionPolicyModel::Fixed(Decimal::from(30u32));
    // a buggy caller zeroing aggregates must not damage the stored record
    edited.total_orders = 0;
    edited.total_sales = Decimal::ZERO;
    edited.total_commission = Decimal::ZERO;
    edited.password_hash = None;
    repo.update_profile(edited).await.unwrap();

    let found = repo.fetch(id.as_str()).await.unwrap().unwrap();
    assert_eq!(found.name.as_str(), "Green Valley Organic Farms");
    assert_eq!(found.commission, CommissionPolicyModel::Fixed(Decimal::from(30u32)));
    assert_eq!(found.total_orders, 7);
    assert_eq!(found.total_sales, Decimal::from(7000u32));
    assert_eq!(found.total_commission, Decimal::from(350u32));
    assert!(found.password_hash.is_some());
}

#[tokio::test]
async fn update_profile_reindexes_code() {
    let repo = ut_repo().await;
    let item = ut_default_partner(ut_now());
    let id = item.id.clone();
    repo.create(item).await.unwrap();
    let mut edited = repo.fetch(id.as_str()).await.unwrap().unwrap();
    edited.partner_code = "VALLEY2".to_string();
    repo.update_profile(edited).await.unwrap();
    assert!(repo.fetch_by_code("GREENV").await.unwrap().is_none());
    assert!(repo.fetch_by_code("VALLEY2").await.unwrap().is_some());
}

#[tokio::test]
async fn fetch_all_active_filter() {
    let repo = ut_repo().await;
    let item = ut_default_partner(ut_now());
    repo.create(item).await.unwrap();
    let mut suspended = ut_default_partner(ut_time("2024-02-01T00:00:00+05:30"));
    suspended.id = "p-beef0002".to_string();
    suspended.partner_code = "PAUSED".to_string();
    suspended.email = "paused@partner.example".to_string();
    suspended.is_active = false;
    repo.create(suspended).await.unwrap();
    let all = repo.fetch_all(false).await.unwrap();
    assert_eq!(all.len(), 2);
    let active = repo.fetch_all(true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].partner_code.as_str(), "GREENV");
}

#[tokio::test]
async fn delete_removes_indices() {
    let repo = ut_repo().await;
    let item = ut_default_partner(ut_now());
    let id = item.id.clone();
    repo.create(item).await.unwrap();
    repo.delete(id.as_str()).await.unwrap();
    assert!(repo.fetch(id.as_str()).await.unwrap().is_none());
    assert!(repo.fetch_by_code("GREENV").await.unwrap().is_none());
    assert!(repo
        .fetch_by_email("contact@greenvalley.example")
        .await
        .unwrap()
        .is_none());
}
