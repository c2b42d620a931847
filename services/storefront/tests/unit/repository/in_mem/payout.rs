use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use storefront::model::{PayoutDetailsModel, PayoutMethod, PayoutRequestModel, PayoutState};
use storefront::repository::{AbsPayoutRepo, PayoutInMemRepo};

use crate::{ut_setup_dstore, ut_time};

fn ut_request(id: &str, amount: u32, created_raw: &str) -> PayoutRequestModel {
    PayoutRequestModel {
        id: id.to_string(),
        partner_id: "p-beef0001".to_string(),
        amount: Decimal::from(amount),
        state: PayoutState::Pending,
        method: PayoutMethod::Upi,
        details_snapshot: PayoutDetailsModel {
            upi_id: Some("greenv@upi".to_string()),
            bank: None,
        },
        admin_notes: None,
        paid_at: None,
        created_at: ut_time(created_raw),
    }
}

async fn ut_repo() -> PayoutInMemRepo {
    let ds = ut_setup_dstore(64);
    PayoutInMemRepo::new(ds).await.unwrap()
}

#[tokio::test]
async fn create_then_fetch_by_partner_sorted() {
    let repo = ut_repo().await;
    repo.create(ut_request("pr-01", 600, "2024-04-01T10:00:00+05:30"))
        .await
        .unwrap();
    repo.create(ut_request("pr-02", 900, "2024-05-01T10:00:00+05:30"))
        .await
        .unwrap();
    let items = repo.fetch_by_partner("p-beef0001").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id.as_str(), "pr-02");
    assert_eq!(items[1].id.as_str(), "pr-01");
    let none = repo.fetch_by_partner("p-other").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn review_approve_then_paid() {
    let repo = ut_repo().await;
    repo.create(ut_request("pr-01", 600, "2024-04-01T10:00:00+05:30"))
        .await
        .unwrap();
    let when = ut_time("2024-04-02T09:00:00+05:30");
    let updated = repo
        .update_review("pr-01", PayoutState::Approved, Some("ok".to_string()), when)
        .await
        .unwrap();
    assert_eq!(updated.state, PayoutState::Approved);
    assert!(updated.paid_at.is_none());
    let later = ut_time("2024-04-03T09:00:00+05:30");
    let updated = repo
        .update_review("pr-01", PayoutState::Paid, None, later)
        .await
        .unwrap();
    assert_eq!(updated.state, PayoutState::Paid);
    assert_eq!(updated.paid_at, Some(later));
    let stored = repo.fetch("pr-01").await.unwrap().unwrap();
    assert_eq!(stored.state, PayoutState::Paid);
    assert_eq!(stored.admin_notes.as_deref(), Some("ok"));
}

#[tokio::test]
async fn review_invalid_transition_rejected() {
    let repo = ut_repo().await;
    repo.create(ut_request("pr-01", 600, "2024-04-01T10:00:00+05:30"))
        .await
        .unwrap();
    let when = ut_time("2024-04-02T09:00:00+05:30");
    let _rejected = repo
        .update_review("pr-01", PayoutState::Rejected, None, when)
        .await
        .unwrap();
    let e = repo
        .update_review("pr-01", PayoutState::Paid, None, when)
        .await
        .unwrap_err();
    assert_eq!(e.code, AppErrorCode::InvalidInput);
    let stored = repo.fetch("pr-01").await.unwrap().unwrap();
    assert_eq!(stored.state, PayoutState::Rejected);
}

#[tokio::test]
async fn review_missing_request() {
    let repo = ut_repo().await;
    let when = ut_time("2024-04-02T09:00:00+05:30");
    let e = repo
        .update_review("pr-ghost", PayoutState::Approved, None, when)
        .await
        .unwrap_err();
    assert_eq!(e.code, AppErrorCode::ObjectNotExist);
}

#[tokio::test]
async fn reserved_amount_excludes_rejected() {
    let repo = ut_repo().await;
    repo.create(ut_request("pr-01", 600, "2024-04-01T10:00:00+05:30"))
        .await
        .unwrap();
    repo.create(ut_request("pr-02", 900, "2024-04-05T10:00:00+05:30"))
        .await
        .unwrap();
    repo.create(ut_request("pr-03", 500, "2024-04-07T10:00:00+05:30"))
        .await
        .unwrap();
    let when = ut_time("2024-04-08T09:00:00+05:30");
    // one paid, one rejected, one left pending
    let _p = repo
        .update_review("pr-01", PayoutState::Paid, None, when)
        .await
        .unwrap();
    let _r = repo
        .update_review("pr-02", PayoutState::Rejected, None, when)
        .await
        .unwrap();
    let reserved = repo.sum_reserved_amount("p-beef0001").await.unwrap();
    assert_eq!(reserved, Decimal::from(1100u32));
}
