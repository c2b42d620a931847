use std::boxed::Box;
use std::sync::Arc;

use rust_decimal::Decimal;

use storefront::api::web::dto::{PayoutRequestCreateReqDto, PayoutReviewReqDto};
use storefront::datastore::AbstInMemoryDStore;
use storefront::model::PayoutDetailsModel;
use storefront::repository::{
    AbsPartnerRepo, AbsPayoutRepo, PartnerInMemRepo, PayoutInMemRepo,
};
use storefront::usecase::{
    available_balance, PayoutHistoryUseCase, PayoutUcError, RequestPayoutUseCase,
    ReviewPayoutUseCase,
};

use crate::model::{ut_default_partner, ut_now};
use crate::{ut_setup_dstore, ut_time};

const PARTNER_ID: &str = "p-beef0001";

async fn ut_seed_partner(ds: Arc<Box<dyn AbstInMemoryDStore>>, earned: u32) {
    let repo = PartnerInMemRepo::new(ds).await.unwrap();
    let mut p = ut_default_partner(ut_now());
    p.total_commission = Decimal::from(earned);
    p.payout_details = Some(PayoutDetailsModel {
        upi_id: Some("greenv@upi".to_string()),
        bank: None,
    });
    repo.create(p).await.unwrap();
}

async fn ut_request_uc(ds: Arc<Box<dyn AbstInMemoryDStore>>) -> RequestPayoutUseCase {
    RequestPayoutUseCase {
        repo_partner: Box::new(PartnerInMemRepo::new(ds.clone()).await.unwrap()),
        repo_payout: Box::new(PayoutInMemRepo::new(ds).await.unwrap()),
    }
}

fn ut_req(amount: u32) -> PayoutRequestCreateReqDto {
    PayoutRequestCreateReqDto {
        amount: Decimal::from(amount),
        payout_method: "UPI".to_string(),
    }
}

#[tokio::test]
async fn request_below_minimum_rejected() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), 2000).await;
    let uc = ut_request_uc(ds).await;
    // a 400-rupee withdrawal stays below the 500 floor
    let result = uc.execute(PARTNER_ID, ut_req(400), ut_now()).await;
    assert!(matches!(result, Err(PayoutUcError::BelowMinimum)));
}

#[tokio::test]
async fn request_over_balance_rejected() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), 700).await;
    let uc = ut_request_uc(ds).await;
    let result = uc.execute(PARTNER_ID, ut_req(800), ut_now()).await;
    assert!(matches!(result, Err(PayoutUcError::InsufficientBalance)));
}

#[tokio::test]
async fn request_without_details_rejected() {
    let ds = ut_setup_dstore(64);
    let p_repo = PartnerInMemRepo::new(ds.clone()).await.unwrap();
    let mut p = ut_default_partner(ut_now());
    p.total_commission = Decimal::from(2000u32);
    p_repo.create(p).await.unwrap(); // no payout details configured
    let uc = ut_request_uc(ds).await;
    let result = uc.execute(PARTNER_ID, ut_req(600), ut_now()).await;
    assert!(matches!(result, Err(PayoutUcError::DetailsNotConfigured)));
}

#[tokio::test]
async fn request_snapshot_and_pending_state() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), 2000).await;
    let uc = ut_request_uc(ds.clone()).await;
    let created = uc
        .execute(PARTNER_ID, ut_req(600), ut_now())
        .await
        .ok()
        .unwrap();
    assert_eq!(created.status.as_str(), "Pending");
    assert_eq!(created.amount, Decimal::from(600u32));
    assert_eq!(created.payout_details.upi_id.as_deref(), Some("greenv@upi"));

    // profile edits after submission must not rewrite the snapshot
    let p_repo = PartnerInMemRepo::new(ds.clone()).await.unwrap();
    p_repo
        .update_payout_details(
            PARTNER_ID,
            PayoutDetailsModel {
                upi_id: Some("changed@upi".to_string()),
                bank: None,
            },
        )
        .await
        .unwrap();
    let pay_repo = PayoutInMemRepo::new(ds).await.unwrap();
    let stored = pay_repo.fetch(created.id.as_str()).await.unwrap().unwrap();
    assert_eq!(
        stored.details_snapshot.upi_id.as_deref(),
        Some("greenv@upi")
    );
}

#[tokio::test]
async fn balance_reservation_across_lifecycle() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), 2000).await;

    // reserve 1500 of the 2000 earned
    let uc = ut_request_uc(ds.clone()).await;
    let first = uc
        .execute(PARTNER_ID, ut_req(1500), ut_now())
        .await
        .ok()
        .unwrap();

    // only 500 left, 600 must bounce
    let uc = ut_request_uc(ds.clone()).await;
    let result = uc.execute(PARTNER_ID, ut_req(600), ut_now()).await;
    assert!(matches!(result, Err(PayoutUcError::InsufficientBalance)));

    // approve then settle the first request, the amount stays excluded
    let review = ReviewPayoutUseCase {
        repo: Box::new(PayoutInMemRepo::new(ds.clone()).await.unwrap()),
    };
    let approved = review
        .execute(
            PayoutReviewReqDto {
                id: first.id.clone(),
                status: "Approved".to_string(),
                admin_notes: None,
            },
            ut_time("2024-05-18T11:00:00+05:30"),
        )
        .await
        .ok()
        .unwrap();
    assert_eq!(approved.status.as_str(), "Approved");
    let review = ReviewPayoutUseCase {
        repo: Box::new(PayoutInMemRepo::new(ds.clone()).await.unwrap()),
    };
    let paid = review
        .execute(
            PayoutReviewReqDto {
                id: first.id.clone(),
                status: "Paid".to_string(),
                admin_notes: Some("UTR 12345".to_string()),
            },
            ut_time("2024-05-19T11:00:00+05:30"),
        )
        .await
        .ok()
        .unwrap();
    assert_eq!(paid.status.as_str(), "Paid");
    assert!(paid.paid_at.is_some());

    let p_repo = PartnerInMemRepo::new(ds.clone()).await.unwrap();
    let partner = p_repo.fetch(PARTNER_ID).await.unwrap().unwrap();
    // lifetime earnings stay intact, the settle shows up in the balance
    assert_eq!(partner.total_commission, Decimal::from(2000u32));
    let pay_repo = PayoutInMemRepo::new(ds.clone()).await.unwrap();
    let balance = available_balance(&partner, &pay_repo).await.unwrap();
    assert_eq!(balance, Decimal::from(500u32));

    // history shows the settled entry
    let history = PayoutHistoryUseCase {
        repo: Box::new(PayoutInMemRepo::new(ds.clone()).await.unwrap()),
    };
    let items = history.execute(PARTNER_ID).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status.as_str(), "Paid");

    // a rejected request frees its amount again
    let uc = ut_request_uc(ds.clone()).await;
    let second = uc
        .execute(PARTNER_ID, ut_req(500), ut_now())
        .await
        .ok()
        .unwrap();
    let review = ReviewPayoutUseCase {
        repo: Box::new(PayoutInMemRepo::new(ds.clone()).await.unwrap()),
    };
    let _rejected = review
        .execute(
            PayoutReviewReqDto {
                id: second.id,
                status: "Rejected".to_string(),
                admin_notes: Some("details mismatch".to_string()),
            },
            ut_time("2024-05-20T11:00:00+05:30"),
        )
        .await
        .ok()
        .unwrap();
    let pay_repo = PayoutInMemRepo::new(ds).await.unwrap();
    let balance = available_balance(&partner, &pay_repo).await.unwrap();
    assert_eq!(balance, Decimal::from(500u32));
} // end of fn balance_reservation_across_lifecycle

#[tokio::test]
async fn review_rejects_transition_out_of_paid() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), 2000).await;
    let uc = ut_request_uc(ds.clone()).await;
    let created = uc
        .execute(PARTNER_ID, ut_req(700), ut_now())
        .await
        .ok()
        .unwrap();
    let review = ReviewPayoutUseCase {
        repo: Box::new(PayoutInMemRepo::new(ds.clone()).await.unwrap()),
    };
    // the fast path straight to Paid is allowed
    let _paid = review
        .execute(
            PayoutReviewReqDto {
                id: created.id.clone(),
                status: "Paid".to_string(),
                admin_notes: None,
            },
            ut_now(),
        )
        .await
        .ok()
        .unwrap();
    let review = ReviewPayoutUseCase {
        repo: Box::new(PayoutInMemRepo::new(ds).await.unwrap()),
    };
    let result = review
        .execute(
            PayoutReviewReqDto {
                id: created.id,
                status: "Pending".to_string(),
                admin_notes: None,
            },
            ut_now(),
        )
        .await;
    assert!(matches!(result, Err(PayoutUcError::InvalidTransition(_))));
}
