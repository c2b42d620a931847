use std::boxed::Box;
use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{CouponCreateReqDto, CouponDto, CouponUpdateReqDto};
use crate::error::AppError;
use crate::generate_doc_id;
use crate::model::{CouponDiscountModel, CouponModel, CouponRejectReason};
use crate::repository::AbsCouponRepo;

pub enum CouponUcError {
    NotFound,
    CodeTaken,
    ReqContent(String),
    Server(AppError),
}

impl From<AppError> for CouponUcError {
    fn from(value: AppError) -> Self {
        match value.code {
            AppErrorCode::DuplicateKeyExists => Self::CodeTaken,
            AppErrorCode::ObjectNotExist => Self::NotFound,
            AppErrorCode::InvalidInput => {
                Self::ReqContent(value.detail.unwrap_or("invalid-input".to_string()))
            }
            ref _others => Self::Server(value),
        }
    }
}

pub struct CreateCouponUseCase {
    pub repo: Box<dyn AbsCouponRepo>,
}

impl CreateCouponUseCase {
    pub async fn execute(
        self,
        data: CouponCreateReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<CouponDto, CouponUcError> {
        let code = CouponModel::normalize_code(data.code.as_str());
        if code.is_empty() {
            return Err(CouponUcError::ReqContent("coupon-code-empty".to_string()));
        }
        let discount =
            CouponDiscountModel::try_from_parts(data.discount_type.as_str(), data.discount_value)?;
        let min_order_value = data.min_order_value.unwrap_or(Decimal::ZERO);
        if min_order_value.is_sign_negative() {
            return Err(CouponUcError::ReqContent(
                "min-order-value-negative".to_string(),
            ));
        }
        let item = CouponModel {
            id: generate_doc_id(),
            code,
            discount,
            min_order_value,
            expiration_date: data.expiration_date,
            usage_limit: data.usage_limit,
            used_count: 0,
            is_active: data.is_active.unwrap_or(true),
            sent_to: data.sent_to,
            created_at: now,
        };
        self.repo.create(item.clone()).await?;
        Ok(item.into())
    } // end of fn execute
} // end of impl CreateCouponUseCase

pub struct EditCouponUseCase {
    pub repo: Box<dyn AbsCouponRepo>,
}

impl EditCouponUseCase {
    pub async fn execute(
        self,
        id: String,
        data: CouponUpdateReqDto,
    ) -> DefaultResult<CouponDto, CouponUcError> {
        let mut item = self
            .repo
            .fetch(id.as_str())
            .await?
            .ok_or(CouponUcError::NotFound)?;
        if data.discount_type.is_some() || data.discount_value.is_some() {
            let label = data
                .discount_type
                .unwrap_or(item.discount.type_label().to_string());
            let value = data.discount_value.unwrap_or(item.discount.value());
            item.discount = CouponDiscountModel::try_from_parts(label.as_str(), value)?;
        }
        if let Some(v) = data.min_order_value {
            if v.is_sign_negative() {
                return Err(CouponUcError::ReqContent(
                    "min-order-value-negative".to_string(),
                ));
            }
            item.min_order_value = v;
        }
        if data.expiration_date.is_some() {
            item.expiration_date = data.expiration_date;
        }
        if data.usage_limit.is_some() {
            item.usage_limit = data.usage_limit;
        }
        if let Some(v) = data.is_active {
            item.is_active = v;
        }
        if data.sent_to.is_some() {
            item.sent_to = data.sent_to;
        }
        self.repo.update(item.clone()).await?;
        Ok(item.into())
    } // end of fn execute
} // end of impl EditCouponUseCase

pub struct RemoveCouponUseCase {
    pub repo: Box<dyn AbsCouponRepo>,
}

impl RemoveCouponUseCase {
    pub async fn execute(self, id: String) -> DefaultResult<(), CouponUcError> {
        self.repo.delete(id.as_str()).await?;
        Ok(())
    }
}

pub struct ListCouponsUseCase {
    pub repo: Box<dyn AbsCouponRepo>,
}

impl ListCouponsUseCase {
    pub async fn execute(self) -> DefaultResult<Vec<CouponDto>, AppError> {
        let items = self.repo.fetch_all().await?;
        Ok(items.into_iter().map(CouponDto::from).collect())
    }
}

pub struct AppliedCouponUcOutput {
    pub code: String,
    pub discount: Decimal,
}

pub enum ApplyCouponUcError {
    Rejected(CouponRejectReason),
    Server(AppError),
}

/// eligibility check plus discount computation, the used-count increment
/// happens separately at checkout through `AbsCouponRepo::redeem`
pub struct ApplyCouponUseCase<'a> {
    pub repo: &'a dyn AbsCouponRepo,
}

impl<'a> ApplyCouponUseCase<'a> {
    pub async fn execute(
        &self,
        code: &str,
        subtotal: Decimal,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<AppliedCouponUcOutput, ApplyCouponUcError> {
        let found = self
            .repo
            .fetch_by_code(code)
            .await
            .map_err(ApplyCouponUcError::Server)?;
        let item = found.ok_or(ApplyCouponUcError::Rejected(CouponRejectReason::NotFound))?;
        item.verify_applicable(subtotal, now)
            .map_err(ApplyCouponUcError::Rejected)?;
        Ok(AppliedCouponUcOutput {
            discount: item.discount_amount(subtotal),
            code: item.code,
        })
    }
} // end of impl ApplyCouponUseCase
