use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use rust_decimal::{Decimal, RoundingStrategy};

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{PartnerDto, PartnerSummaryDto};
use crate::constant::{MIN_PASSWORD_LENGTH, PARTNER_CODE_MAX_LENGTH, PARTNER_CODE_MIN_LENGTH};
use crate::error::AppError;

use super::PayoutDetailsModel;

#[derive(Debug, Clone, PartialEq)]
pub enum CommissionPolicyModel {
    Percentage(Decimal),
    Fixed(Decimal),
}

impl CommissionPolicyModel {
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::Fixed(_) => "fixed",
        }
    }
    pub fn value(&self) -> Decimal {
        match self {
            Self::Percentage(v) | Self::Fixed(v) => *v,
        }
    }
    pub fn try_from_parts(label: &str, value: Decimal) -> DefaultResult<Self, AppError> {
        match label {
            "percentage" => {
                if value.is_sign_negative() || value > Decimal::ONE_HUNDRED {
                    Err(AppError {
                        code: AppErrorCode::InvalidInput,
                        detail: Some("percentage-commission-out-of-range".to_string()),
                    })
                } else {
                    Ok(Self::Percentage(value))
                }
            }
            "fixed" => {
                if value.is_sign_negative() {
                    Err(AppError {
                        code: AppErrorCode::InvalidInput,
                        detail: Some("fixed-commission-negative".to_string()),
                    })
                } else {
                    Ok(Self::Fixed(value))
                }
            }
            _others => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("commission-type:{label}")),
            }),
        }
    }

    pub fn amount_for(&self, order_amount: Decimal) -> Decimal {
        match self {
            Self::Percentage(v) => (order_amount * (*v) / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            Self::Fixed(v) => *v,
        }
    }
} // end of impl CommissionPolicyModel

#[derive(Debug, Clone)]
pub struct PartnerModel {
    pub id: String,
    pub name: String,
    pub email: String,        // stored lowercase, unique
    pub phone: Option<String>,
    pub partner_code: String, // stored uppercase, unique, shared with buyers
    pub commission: CommissionPolicyModel,
    pub is_active: bool,
    // login gate independent of `is_active`, a suspended partner may still
    // keep credentials while an active one can be locked out
    pub has_access: bool,
    pub password_hash: Option<String>,
    pub login_count: u32,
    pub last_login_at: Option<DateTime<FixedOffset>>,
    pub payout_details: Option<PayoutDetailsModel>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    // running aggregates, updated by atomic increments at accrual time,
    // never recomputed from order history
    pub total_orders: u64,
    pub total_sales: Decimal,
    pub total_commission: Decimal,
    pub created_at: DateTime<FixedOffset>,
}

impl PartnerModel {
    pub fn normalize_code(raw: &str) -> String {
        raw.trim().to_uppercase()
    }
    pub fn normalize_email(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn validate_code(code: &str) -> DefaultResult<(), AppError> {
        let sz = code.len();
        if (PARTNER_CODE_MIN_LENGTH..=PARTNER_CODE_MAX_LENGTH).contains(&sz) {
            Ok(())
        } else {
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("partner-code-length:{sz}")),
            })
        }
    }

    pub fn assign_password(&mut self, plain: &str) -> DefaultResult<(), AppError> {
        if plain.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some("password-too-short".to_string()),
            });
        }
        let hashed = bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|e| AppError {
            code: AppErrorCode::CryptoFailure,
            detail: Some(e.to_string()),
        })?;
        self.password_hash = Some(hashed);
        Ok(())
    }

    pub fn verify_password(&self, given: &str) -> DefaultResult<bool, AppError> {
        let hashed = self.password_hash.as_ref().ok_or(AppError {
            code: AppErrorCode::EmptyInputData,
            detail: Some("password-not-set".to_string()),
        })?;
        bcrypt::verify(given, hashed.as_str()).map_err(|e| AppError {
            code: AppErrorCode::CryptoFailure,
            detail: Some(e.to_string()),
        })
    }

    /// update running aggregates for one referred order, returns the
    /// commission earned on it
    pub fn accrue(&mut self, order_amount: Decimal) -> Decimal {
        let commission = self.commission.amount_for(order_amount);
        self.total_orders += 1;
        self.total_sales += order_amount;
        self.total_commission += commission;
        commission
    }
} // end of impl PartnerModel

// the password hash never leaves the service, it has no DTO counterpart
impl From<&PartnerModel> for PartnerDto {
    fn from(value: &PartnerModel) -> PartnerDto {
        PartnerDto {
            id: value.id.clone(),
            name: value.name.clone(),
            email: value.email.clone(),
            phone: value.phone.clone(),
            partner_code: value.partner_code.clone(),
            commission_type: value.commission.type_label().to_string(),
            commission_value: value.commission.value(),
            is_active: value.is_active,
            has_access: value.has_access,
            login_count: value.login_count,
            last_login_at: value.last_login_at,
            payout_details: value.payout_details.clone().map(Into::into),
            logo: value.logo.clone(),
            description: value.description.clone(),
            website: value.website.clone(),
            total_orders: value.total_orders,
            total_sales: value.total_sales,
            total_commission: value.total_commission,
            created_at: value.created_at,
        }
    }
}

impl From<&PartnerModel> for PartnerSummaryDto {
    fn from(value: &PartnerModel) -> PartnerSummaryDto {
        PartnerSummaryDto {
            id: value.id.clone(),
            name: value.name.clone(),
            email: value.email.clone(),
            partner_code: value.partner_code.clone(),
            commission_type: value.commission.type_label().to_string(),
            commission_value: value.commission.value(),
        }
    }
}
