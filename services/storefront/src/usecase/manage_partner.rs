use std::boxed::Box;
use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use ecommerce_common::constant::REGEX_EMAIL_RFC5322;
use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{
    PartnerCreateReqDto, PartnerDto, PartnerUpdateReqDto, PayoutDetailsDto,
};
use crate::error::AppError;
use crate::generate_doc_id;
use crate::model::{CommissionPolicyModel, PartnerModel, PayoutDetailsModel};
use crate::repository::AbsPartnerRepo;

pub enum PartnerUcError {
    NotFound,
    Duplicate(String),
    ReqContent(String),
    Server(AppError),
}

impl From<AppError> for PartnerUcError {
    fn from(value: AppError) -> Self {
        match value.code {
            AppErrorCode::ObjectNotExist => Self::NotFound,
            AppErrorCode::DuplicateKeyExists => {
                Self::Duplicate(value.detail.unwrap_or("key".to_string()))
            }
            AppErrorCode::InvalidInput => {
                Self::ReqContent(value.detail.unwrap_or("invalid-input".to_string()))
            }
            ref _others => Self::Server(value),
        }
    }
}

fn verify_email_format(email: &str) -> DefaultResult<(), PartnerUcError> {
    let re = Regex::new(REGEX_EMAIL_RFC5322).map_err(|e| {
        PartnerUcError::Server(AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(e.to_string()),
        })
    })?;
    if re.is_match(email) {
        Ok(())
    } else {
        Err(PartnerUcError::ReqContent(format!("email-format:{email}")))
    }
}

pub struct CreatePartnerUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
}

impl CreatePartnerUseCase {
    pub async fn execute(
        self,
        data: PartnerCreateReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PartnerDto, PartnerUcError> {
        if data.name.trim().is_empty() {
            return Err(PartnerUcError::ReqContent("partner-name-empty".to_string()));
        }
        let email = PartnerModel::normalize_email(data.email.as_str());
        verify_email_format(email.as_str())?;
        let partner_code = PartnerModel::normalize_code(data.partner_code.as_str());
        PartnerModel::validate_code(partner_code.as_str())?;
        let commission = CommissionPolicyModel::try_from_parts(
            data.commission_type.as_str(),
            data.commission_value,
        )?;
        let mut item = PartnerModel {
            id: generate_doc_id(),
            name: data.name,
            email,
            phone: data.phone,
            partner_code,
            commission,
            is_active: data.is_active,
            has_access: data.has_access,
            password_hash: None,
            login_count: 0,
            last_login_at: None,
            payout_details: None,
            logo: data.logo,
            description: data.description,
            website: data.website,
            total_orders: 0,
            total_sales: rust_decimal::Decimal::ZERO,
            total_commission: rust_decimal::Decimal::ZERO,
            created_at: now,
        };
        if let Some(plain) = data.password.as_ref() {
            item.assign_password(plain.as_str())?;
        }
        self.repo.create(item.clone()).await?;
        Ok(PartnerDto::from(&item))
    } // end of fn execute
} // end of impl CreatePartnerUseCase

pub struct EditPartnerUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
}

impl EditPartnerUseCase {
    pub async fn execute(
        self,
        id: String,
        data: PartnerUpdateReqDto,
    ) -> DefaultResult<PartnerDto, PartnerUcError> {
        let mut item = self
            .repo
            .fetch(id.as_str())
            .await?
            .ok_or(PartnerUcError::NotFound)?;
        if let Some(v) = data.name {
            if v.trim().is_empty() {
                return Err(PartnerUcError::ReqContent("partner-name-empty".to_string()));
            }
            item.name = v;
        }
        if let Some(v) = data.email {
            let email = PartnerModel::normalize_email(v.as_str());
            verify_email_format(email.as_str())?;
            item.email = email;
        }
        if let Some(v) = data.partner_code {
            let code = PartnerModel::normalize_code(v.as_str());
            PartnerModel::validate_code(code.as_str())?;
            item.partner_code = code;
        }
        if data.commission_type.is_some() || data.commission_value.is_some() {
            let label = data
                .commission_type
                .unwrap_or(item.commission.type_label().to_string());
            let value = data.commission_value.unwrap_or(item.commission.value());
            item.commission = CommissionPolicyModel::try_from_parts(label.as_str(), value)?;
        }
        if data.phone.is_some() {
            item.phone = data.phone;
        }
        if data.logo.is_some() {
            item.logo = data.logo;
        }
        if data.description.is_some() {
            item.description = data.description;
        }
        if data.website.is_some() {
            item.website = data.website;
        }
        if let Some(v) = data.is_active {
            item.is_active = v;
        }
        if let Some(v) = data.has_access {
            item.has_access = v;
        }
        self.repo.update_profile(item.clone()).await?;
        // aggregates / credential fields in the returned view come from the
        // stored record, re-read for accuracy
        let refreshed = self
            .repo
            .fetch(id.as_str())
            .await?
            .ok_or(PartnerUcError::NotFound)?;
        Ok(PartnerDto::from(&refreshed))
    } // end of fn execute
} // end of impl EditPartnerUseCase

pub struct RemovePartnerUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
}

impl RemovePartnerUseCase {
    pub async fn execute(self, id: String) -> DefaultResult<(), PartnerUcError> {
        self.repo.delete(id.as_str()).await?;
        Ok(())
    }
}

pub struct ListPartnersUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
}

impl ListPartnersUseCase {
    pub async fn execute(self, active_only: bool) -> DefaultResult<Vec<PartnerDto>, AppError> {
        let items = self.repo.fetch_all(active_only).await?;
        Ok(items.iter().map(PartnerDto::from).collect())
    }
}

pub struct GetPartnerUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
}

impl GetPartnerUseCase {
    pub async fn execute(self, id: String) -> DefaultResult<PartnerDto, PartnerUcError> {
        let item = self
            .repo
            .fetch(id.as_str())
            .await?
            .ok_or(PartnerUcError::NotFound)?;
        Ok(PartnerDto::from(&item))
    }
}

pub struct SetPartnerPasswordUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
}

impl SetPartnerPasswordUseCase {
    pub async fn execute(self, id: String, password: String) -> DefaultResult<(), PartnerUcError> {
        let mut item = self
            .repo
            .fetch(id.as_str())
            .await?
            .ok_or(PartnerUcError::NotFound)?;
        item.assign_password(password.as_str())?;
        let hash = item.password_hash.take().ok_or(PartnerUcError::Server(AppError {
            code: AppErrorCode::Unknown,
            detail: Some("password-hash-missing".to_string()),
        }))?;
        self.repo.save_password(id.as_str(), hash).await?;
        Ok(())
    }
}

/// partner self-service view and edit of payout destination, `GET` and
/// `PUT /partners/payout`
pub struct PartnerPayoutDetailsUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
}

impl PartnerPayoutDetailsUseCase {
    pub async fn read(self, partner_id: &str) -> DefaultResult<PayoutDetailsDto, PartnerUcError> {
        let item = self
            .repo
            .fetch(partner_id)
            .await?
            .ok_or(PartnerUcError::NotFound)?;
        let out = item.payout_details.unwrap_or_default();
        Ok(out.into())
    }

    pub async fn write(
        self,
        partner_id: &str,
        data: PayoutDetailsDto,
    ) -> DefaultResult<PayoutDetailsDto, PartnerUcError> {
        let details = PayoutDetailsModel::from(data);
        self.repo
            .update_payout_details(partner_id, details.clone())
            .await?;
        Ok(details.into())
    }
} // end of impl PartnerPayoutDetailsUseCase
