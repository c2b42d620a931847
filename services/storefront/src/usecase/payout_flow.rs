use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{
    PayoutPartnerBriefDto, PayoutRequestCreateReqDto, PayoutRequestDto, PayoutReviewReqDto,
};
use crate::constant::MIN_PAYOUT_AMOUNT;
use crate::error::AppError;
use crate::generate_doc_id;
use crate::model::{PartnerModel, PayoutMethod, PayoutRequestModel, PayoutState};
use crate::repository::{AbsPartnerRepo, AbsPayoutRepo};

pub enum PayoutUcError {
    PartnerNotFound,
    NotFound,
    ReqContent(String),
    BelowMinimum,
    InsufficientBalance,
    DetailsNotConfigured,
    InvalidTransition(String),
    Server(AppError),
}

/// commission still open for withdrawal, lifetime earnings are never
/// destructively reduced, settled (Paid) and in-flight requests stay
/// subtracted instead, a Rejected request frees its amount
pub async fn available_balance(
    partner: &PartnerModel,
    repo_payout: &dyn AbsPayoutRepo,
) -> DefaultResult<Decimal, AppError> {
    let reserved = repo_payout.sum_reserved_amount(partner.id.as_str()).await?;
    Ok(partner.total_commission - reserved)
}

pub struct RequestPayoutUseCase {
    pub repo_partner: Box<dyn AbsPartnerRepo>,
    pub repo_payout: Box<dyn AbsPayoutRepo>,
}

impl RequestPayoutUseCase {
    pub async fn execute(
        self,
        partner_id: &str,
        data: PayoutRequestCreateReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PayoutRequestDto, PayoutUcError> {
        let partner = self
            .repo_partner
            .fetch(partner_id)
            .await
            .map_err(PayoutUcError::Server)?
            .ok_or(PayoutUcError::PartnerNotFound)?;
        if data.amount <= Decimal::ZERO {
            return Err(PayoutUcError::ReqContent("invalid-amount".to_string()));
        }
        if data.amount < Decimal::from(MIN_PAYOUT_AMOUNT) {
            return Err(PayoutUcError::BelowMinimum);
        }
        let balance = available_balance(&partner, self.repo_payout.as_ref())
            .await
            .map_err(PayoutUcError::Server)?;
        if balance < data.amount {
            return Err(PayoutUcError::InsufficientBalance);
        }
        let method = PayoutMethod::from_str(data.payout_method.as_str())
            .map_err(|e| PayoutUcError::ReqContent(e.detail.unwrap_or_default()))?;
        let details = partner.payout_details.clone().unwrap_or_default();
        if !details.supports(&method) {
            return Err(PayoutUcError::DetailsNotConfigured);
        }
        let item = PayoutRequestModel {
            id: generate_doc_id(),
            partner_id: partner.id.clone(),
            amount: data.amount,
            state: PayoutState::Pending,
            method,
            // copied now so later profile edits never rewrite a submitted
            // request
            details_snapshot: details,
            admin_notes: None,
            paid_at: None,
            created_at: now,
        };
        self.repo_payout
            .create(item.clone())
            .await
            .map_err(PayoutUcError::Server)?;
        Ok(item.into())
    } // end of fn execute
} // end of impl RequestPayoutUseCase

pub struct PayoutHistoryUseCase {
    pub repo: Box<dyn AbsPayoutRepo>,
}

impl PayoutHistoryUseCase {
    pub async fn execute(self, partner_id: &str) -> DefaultResult<Vec<PayoutRequestDto>, AppError> {
        let items = self.repo.fetch_by_partner(partner_id).await?;
        Ok(items.into_iter().map(PayoutRequestDto::from).collect())
    }
}

/// admin view over all requests, each row joined with a short partner
/// profile for display
pub struct ListAllPayoutsUseCase {
    pub repo_payout: Box<dyn AbsPayoutRepo>,
    pub repo_partner: Box<dyn AbsPartnerRepo>,
}

impl ListAllPayoutsUseCase {
    pub async fn execute(self) -> DefaultResult<Vec<PayoutRequestDto>, AppError> {
        let items = self.repo_payout.fetch_all().await?;
        let mut brief_cache: HashMap<String, Option<PayoutPartnerBriefDto>> = HashMap::new();
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let pid = item.partner_id.clone();
            if !brief_cache.contains_key(pid.as_str()) {
                let brief = self.repo_partner.fetch(pid.as_str()).await?.map(|p| {
                    PayoutPartnerBriefDto {
                        name: p.name,
                        email: p.email,
                        partner_code: p.partner_code,
                    }
                });
                brief_cache.insert(pid.clone(), brief);
            }
            let mut dto = PayoutRequestDto::from(item);
            dto.partner = brief_cache.get(pid.as_str()).cloned().flatten();
            out.push(dto);
        }
        Ok(out)
    } // end of fn execute
} // end of impl ListAllPayoutsUseCase

pub struct ReviewPayoutUseCase {
    pub repo: Box<dyn AbsPayoutRepo>,
}

impl ReviewPayoutUseCase {
    pub async fn execute(
        self,
        data: PayoutReviewReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PayoutRequestDto, PayoutUcError> {
        if data.id.trim().is_empty() {
            return Err(PayoutUcError::ReqContent("payout-id-missing".to_string()));
        }
        let next = PayoutState::from_str(data.status.as_str())
            .map_err(|e| PayoutUcError::ReqContent(e.detail.unwrap_or_default()))?;
        let updated = self
            .repo
            .update_review(data.id.as_str(), next, data.admin_notes, now)
            .await
            .map_err(|e| match e.code {
                AppErrorCode::ObjectNotExist => PayoutUcError::NotFound,
                AppErrorCode::InvalidInput => {
                    PayoutUcError::InvalidTransition(e.detail.unwrap_or_default())
                }
                ref _others => PayoutUcError::Server(e),
            })?;
        Ok(updated.into())
    } // end of fn execute
} // end of impl ReviewPayoutUseCase
