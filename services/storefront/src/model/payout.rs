use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{BankDetailsDto, PayoutDetailsDto, PayoutRequestDto};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutState {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl PayoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Paid => "Paid",
        }
    }
    // valid transitions, admin-triggered only :
    // Pending -> Approved | Rejected | Paid , Approved -> Paid
    // Paid and Rejected are terminal
    pub fn can_transit_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Paid)
                | (Self::Approved, Self::Paid)
        )
    }
    // states whose amount stays reserved against the partner balance,
    // a rejected request frees its amount again
    pub fn holds_balance(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl FromStr for PayoutState {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            "Paid" => Ok(Self::Paid),
            _others => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("payout-status:{s}")),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutMethod {
    Upi,
    Bank,
}

impl PayoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Bank => "Bank",
        }
    }
}
impl FromStr for PayoutMethod {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        match s {
            "UPI" => Ok(Self::Upi),
            "Bank" => Ok(Self::Bank),
            _others => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("payout-method:{s}")),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankAccountModel {
    pub account_holder: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutDetailsModel {
    pub upi_id: Option<String>,
    pub bank: Option<BankAccountModel>,
}

impl PayoutDetailsModel {
    pub fn supports(&self, method: &PayoutMethod) -> bool {
        match method {
            PayoutMethod::Upi => self.upi_id.as_ref().map(|s| !s.is_empty()).unwrap_or(false),
            PayoutMethod::Bank => self
                .bank
                .as_ref()
                .map(|b| !b.account_number.is_empty())
                .unwrap_or(false),
        }
    }
}

impl From<BankDetailsDto> for BankAccountModel {
    fn from(value: BankDetailsDto) -> Self {
        Self {
            account_holder: value.account_holder,
            account_number: value.account_number,
            ifsc_code: value.ifsc_code,
            bank_name: value.bank_name,
        }
    }
}
impl From<BankAccountModel> for BankDetailsDto {
    fn from(value: BankAccountModel) -> Self {
        Self {
            account_holder: value.account_holder,
            account_number: value.account_number,
            ifsc_code: value.ifsc_code,
            bank_name: value.bank_name,
        }
    }
}
impl From<PayoutDetailsDto> for PayoutDetailsModel {
    fn from(value: PayoutDetailsDto) -> Self {
        Self {
            upi_id: value.upi_id,
            bank: value.bank_details.map(BankAccountModel::from),
        }
    }
}
impl From<PayoutDetailsModel> for PayoutDetailsDto {
    fn from(value: PayoutDetailsModel) -> Self {
        Self {
            upi_id: value.upi_id,
            bank_details: value.bank.map(BankDetailsDto::from),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PayoutRequestModel {
    pub id: String,
    pub partner_id: String,
    pub amount: Decimal,
    pub state: PayoutState,
    pub method: PayoutMethod,
    // copied from the partner profile at request time, later profile edits
    // must not retroactively change a submitted request
    pub details_snapshot: PayoutDetailsModel,
    pub admin_notes: Option<String>,
    pub paid_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl PayoutRequestModel {
    pub fn apply_review(
        &mut self,
        next: PayoutState,
        notes: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<(), AppError> {
        if !self.state.can_transit_to(&next) {
            let detail = format!(
                "payout-transition, from:{}, to:{}",
                self.state.as_str(),
                next.as_str()
            );
            return Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(detail),
            });
        }
        self.state = next;
        if notes.is_some() {
            self.admin_notes = notes;
        }
        if matches!(next, PayoutState::Paid) {
            self.paid_at = Some(now);
        }
        Ok(())
    }
} // end of impl PayoutRequestModel

impl From<PayoutRequestModel> for PayoutRequestDto {
    fn from(value: PayoutRequestModel) -> PayoutRequestDto {
        PayoutRequestDto {
            id: value.id,
            partner_id: value.partner_id,
            partner: None, // filled by use-cases that join the partner record
            amount: value.amount,
            status: value.state.as_str().to_string(),
            payout_method: value.method.as_str().to_string(),
            payout_details: value.details_snapshot.into(),
            admin_notes: value.admin_notes,
            paid_at: value.paid_at,
            created_at: value.created_at,
        }
    }
}
