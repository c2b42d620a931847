use rust_decimal::Decimal;

use storefront::model::{
    BankAccountModel, PayoutDetailsModel, PayoutMethod, PayoutRequestModel, PayoutState,
};

use super::ut_now;
use crate::ut_time;

fn ut_request(state: PayoutState) -> PayoutRequestModel {
    PayoutRequestModel {
        id: "pr-0001".to_string(),
        partner_id: "p-beef0001".to_string(),
        amount: Decimal::from(800u32),
        state,
        method: PayoutMethod::Upi,
        details_snapshot: PayoutDetailsModel {
            upi_id: Some("partner@upi".to_string()),
            bank: None,
        },
        admin_notes: None,
        paid_at: None,
        created_at: ut_now(),
    }
}

#[test]
fn transition_matrix() {
    let cases = [
        (PayoutState::Pending, PayoutState::Approved, true),
        (PayoutState::Pending, PayoutState::Rejected, true),
        (PayoutState::Pending, PayoutState::Paid, true),
        (PayoutState::Approved, PayoutState::Paid, true),
        (PayoutState::Approved, PayoutState::Rejected, false),
        (PayoutState::Approved, PayoutState::Pending, false),
        (PayoutState::Paid, PayoutState::Pending, false),
        (PayoutState::Paid, PayoutState::Rejected, false),
        (PayoutState::Paid, PayoutState::Approved, false),
        (PayoutState::Rejected, PayoutState::Pending, false),
        (PayoutState::Rejected, PayoutState::Paid, false),
        (PayoutState::Pending, PayoutState::Pending, false),
    ];
    for (from, to, expect) in cases {
        assert_eq!(from.can_transit_to(&to), expect, "{:?} -> {:?}", from, to);
    }
}

#[test]
fn review_marks_paid_with_timestamp() {
    let mut req = ut_request(PayoutState::Pending);
    let when = ut_time("2024-05-20T09:00:00+05:30");
    req.apply_review(PayoutState::Approved, Some("verified KYC".to_string()), when)
        .unwrap();
    assert_eq!(req.state, PayoutState::Approved);
    assert_eq!(req.admin_notes.as_deref(), Some("verified KYC"));
    assert!(req.paid_at.is_none());
    let later = ut_time("2024-05-21T09:00:00+05:30");
    req.apply_review(PayoutState::Paid, None, later).unwrap();
    assert_eq!(req.state, PayoutState::Paid);
    assert_eq!(req.paid_at, Some(later));
    // notes from the earlier review survive when none are given
    assert_eq!(req.admin_notes.as_deref(), Some("verified KYC"));
}

#[test]
fn review_rejects_invalid_transition() {
    let mut req = ut_request(PayoutState::Rejected);
    let result = req.apply_review(PayoutState::Paid, None, ut_now());
    assert!(result.is_err());
    assert_eq!(req.state, PayoutState::Rejected);
}

#[test]
fn rejected_request_frees_balance() {
    assert!(PayoutState::Pending.holds_balance());
    assert!(PayoutState::Approved.holds_balance());
    assert!(PayoutState::Paid.holds_balance());
    assert!(!PayoutState::Rejected.holds_balance());
}

#[test]
fn details_support_check() {
    let details = PayoutDetailsModel {
        upi_id: Some("partner@upi".to_string()),
        bank: None,
    };
    assert!(details.supports(&PayoutMethod::Upi));
    assert!(!details.supports(&PayoutMethod::Bank));
    let details = PayoutDetailsModel {
        upi_id: None,
        bank: Some(BankAccountModel {
            account_holder: "Green Valley Farms".to_string(),
            account_number: "0012345678".to_string(),
            ifsc_code: "HDFC0001234".to_string(),
            bank_name: "HDFC".to_string(),
        }),
    };
    assert!(!details.supports(&PayoutMethod::Upi));
    assert!(details.supports(&PayoutMethod::Bank));
    let empty = PayoutDetailsModel::default();
    assert!(!empty.supports(&PayoutMethod::Upi));
    assert!(!empty.supports(&PayoutMethod::Bank));
}
