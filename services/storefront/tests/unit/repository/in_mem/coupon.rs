use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use storefront::model::CouponDiscountModel;
use storefront::repository::{AbsCouponRepo, CouponInMemRepo};

use crate::model::{ut_default_coupon, ut_now};
use crate::{ut_setup_dstore, ut_time};

async fn ut_repo() -> CouponInMemRepo {
    let ds = ut_setup_dstore(64);
    CouponInMemRepo::new(ds).await.unwrap()
}

#[tokio::test]
async fn create_then_fetch_by_code() {
    let repo = ut_repo().await;
    let item = ut_default_coupon(ut_now());
    repo.create(item).await.unwrap();
    let found = repo.fetch_by_code("save10").await.unwrap().unwrap();
    assert_eq!(found.code.as_str(), "SAVE10");
    assert_eq!(
        found.discount,
        CouponDiscountModel::Percentage(Decimal::from(10u32))
    );
    assert_eq!(found.used_count, 0);
    let missing = repo.fetch_by_code("NOPE").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn create_duplicate_code_rejected() {
    let repo = ut_repo().await;
    let item = ut_default_coupon(ut_now());
    repo.create(item).await.unwrap();
    let mut dup = ut_default_coupon(ut_now());
    dup.id = "c-beef0002".to_string();
    let e = repo.create(dup).await.unwrap_err();
    assert_eq!(e.code, AppErrorCode::DuplicateKeyExists);
}

#[tokio::test]
async fn redeem_increments_until_limit() {
    let repo = ut_repo().await;
    let mut item = ut_default_coupon(ut_now());
    item.usage_limit = Some(2);
    repo.create(item).await.unwrap();
    repo.redeem("SAVE10").await.unwrap();
    repo.redeem("SAVE10").await.unwrap();
    let found = repo.fetch_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(found.used_count, 2);
    let e = repo.redeem("SAVE10").await.unwrap_err();
    assert_eq!(e.code, AppErrorCode::ExceedingMaxLimit);
    let found = repo.fetch_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(found.used_count, 2);
}

#[tokio::test]
async fn redeem_unknown_code() {
    let repo = ut_repo().await;
    let e = repo.redeem("GHOST").await.unwrap_err();
    assert_eq!(e.code, AppErrorCode::ObjectNotExist);
}

#[tokio::test]
async fn update_preserves_used_count() {
    let repo = ut_repo().await;
    let item = ut_default_coupon(ut_now());
    repo.create(item).await.unwrap();
    repo.redeem("SAVE10").await.unwrap();
    let mut edited = repo.fetch_by_code("SAVE10").await.unwrap().unwrap();
    edited.discount = CouponDiscountModel::Fixed(Decimal::from(75u32));
    edited.used_count = 0; // a stale caller-side value must not win
    repo.update(edited).await.unwrap();
    let found = repo.fetch_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(found.used_count, 1);
    assert_eq!(found.discount, CouponDiscountModel::Fixed(Decimal::from(75u32)));
}

#[tokio::test]
async fn fetch_all_newest_first() {
    let repo = ut_repo().await;
    let mut older = ut_default_coupon(ut_time("2024-01-10T00:00:00+05:30"));
    older.id = "c-old".to_string();
    older.code = "WELCOME5".to_string();
    let newer = ut_default_coupon(ut_time("2024-03-10T00:00:00+05:30"));
    repo.create(older).await.unwrap();
    repo.create(newer).await.unwrap();
    let all = repo.fetch_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].code.as_str(), "SAVE10");
    assert_eq!(all[1].code.as_str(), "WELCOME5");
}

#[tokio::test]
async fn delete_frees_code() {
    let repo = ut_repo().await;
    let item = ut_default_coupon(ut_now());
    let id = item.id.clone();
    repo.create(item).await.unwrap();
    repo.delete(id.as_str()).await.unwrap();
    assert!(repo.fetch_by_code("SAVE10").await.unwrap().is_none());
    // same code can be registered again afterwards
    let mut again = ut_default_coupon(ut_now());
    again.id = "c-beef0003".to_string();
    repo.create(again).await.unwrap();
}
