use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::{Decimal, RoundingStrategy};

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::CouponDto;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum CouponDiscountModel {
    Percentage(Decimal),
    Fixed(Decimal),
}

#[derive(Debug, PartialEq, Eq)]
pub enum CouponRejectReason {
    NotFound,
    Inactive,
    Expired,
    BelowMinimum,
    UsageExhausted,
}

impl CouponDiscountModel {
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
        if value.is_sign_negative() {
            return Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some("discount-value-negative".to_string()),
            });
        }
        match label {
            "percentage" => {
                if value > Decimal::ONE_HUNDRED {
                    Err(AppError {
                        code: AppErrorCode::InvalidInput,
                        detail: Some("percentage-over-100".to_string()),
                    })
                } else {
                    Ok(Self::Percentage(value))
                }
            }
            "fixed" => Ok(Self::Fixed(value)),
            _others => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("discount-type:{label}")),
            }),
        }
    }

    // the storefront charges whole currency units, percentage cut rounds
    // half-away-from-zero; fixed cut never exceeds the subtotal so the
    // grand total cannot turn negative
    pub fn amount_off(&self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Percentage(v) => (subtotal * (*v) / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            Self::Fixed(v) => (*v).min(subtotal),
        }
    }
} // end of impl CouponDiscountModel

#[derive(Debug, Clone)]
pub struct CouponModel {
    pub id: String,
    pub code: String, // stored normalized-uppercase, unique
    pub discount: CouponDiscountModel,
    pub min_order_value: Decimal,
    pub expiration_date: Option<DateTime<FixedOffset>>,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub is_active: bool,
    pub sent_to: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl CouponModel {
    pub fn normalize_code(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    pub fn verify_applicable(
        &self,
        subtotal: Decimal,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<(), CouponRejectReason> {
        if !self.is_active {
            Err(CouponRejectReason::Inactive)
        } else if self.expiration_date.map(|t| t < now).unwrap_or(false) {
            Err(CouponRejectReason::Expired)
        } else if subtotal < self.min_order_value {
            Err(CouponRejectReason::BelowMinimum)
        } else if self
            .usage_limit
            .map(|lmt| self.used_count >= lmt)
            .unwrap_or(false)
        {
            Err(CouponRejectReason::UsageExhausted)
        } else {
            Ok(())
        }
    }

    pub fn discount_amount(&self, subtotal: Decimal) -> Decimal {
        self.discount.amount_off(subtotal)
    }
} // end of impl CouponModel

impl From<CouponModel> for CouponDto {
    fn from(value: CouponModel) -> CouponDto {
        CouponDto {
            id: value.id,
            code: value.code,
            discount_type: value.discount.type_label().to_string(),
            discount_value: value.discount.value(),
            min_order_value: value.min_order_value,
            expiration_date: value.expiration_date,
            usage_limit: value.usage_limit,
            used_count: value.used_count,
            is_active: value.is_active,
            sent_to: value.sent_to,
            created_at: value.created_at,
        }
    }
}

impl FromStr for CouponRejectReason {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        match s {
            "not-found" => Ok(Self::NotFound),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            "below-minimum" => Ok(Self::BelowMinimum),
            "usage-exhausted" => Ok(Self::UsageExhausted),
            _others => Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("coupon-reject-reason:{s}")),
            }),
        }
    }
}
impl CouponRejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
            Self::BelowMinimum => "below-minimum",
            Self::UsageExhausted => "usage-exhausted",
        }
    }
    pub fn user_facing_message(&self) -> &'static str {
        match self {
            Self::NotFound => "Coupon not found",
            Self::Inactive => "Coupon is no longer active",
            Self::Expired => "Coupon has expired",
            Self::BelowMinimum => "Order amount below coupon minimum",
            Self::UsageExhausted => "Coupon usage limit reached",
        }
    }
}
