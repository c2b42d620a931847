use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;
use ecommerce_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::AbstractMailGateway;
use crate::api::web::dto::{NotifyReqDto, OrderCreateReqDto, OrderCreateRespDto};
use crate::constant::hard_limit::MAX_ORDER_LINES_PER_REQUEST;
use crate::error::AppError;
use crate::model::{
    CouponRejectReason, OrderLineModel, OrderModel, OrderStatus, PaymentMethod, ShippingRateModel,
};
use crate::repository::{
    AbsContentRepo, AbsCouponRepo, AbsOrderRepo, AbsPartnerRepo, CommissionAccrualModel,
};
use crate::usecase::manage_coupon::{ApplyCouponUcError, ApplyCouponUseCase};
use crate::usecase::notify_order::dispatch_notification;

const SHIPPING_RATE_SECTION: &str = "shipping-rates";
const MAX_ORDER_ID_ATTEMPTS: u8 = 3;

pub enum PlaceOrderUcError {
    ReqContent(String),
    CouponRejected(CouponRejectReason),
    Server(Vec<AppError>),
}

impl From<AppError> for PlaceOrderUcError {
    fn from(value: AppError) -> Self {
        Self::Server(vec![value])
    }
}

pub struct PlaceOrderUseCase {
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub repo_coupon: Box<dyn AbsCouponRepo>,
    pub repo_partner: Box<dyn AbsPartnerRepo>,
    pub repo_content: Box<dyn AbsContentRepo>,
    pub mail_gateway: Arc<Box<dyn AbstractMailGateway>>,
    pub logctx: Arc<AppLogContext>,
}

impl PlaceOrderUseCase {
    pub async fn execute(
        self,
        req: OrderCreateReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<OrderCreateRespDto, PlaceOrderUcError> {
        Self::validate_content(&req)?;
        let payment_method = PaymentMethod::from_str(req.payment_method.as_str())
            .map_err(|e| PlaceOrderUcError::ReqContent(e.detail.unwrap_or_default()))?;
        let lines = req
            .items
            .iter()
            .cloned()
            .map(OrderLineModel::from)
            .collect::<Vec<_>>();
        let subtotal: Decimal = lines.iter().map(OrderLineModel::subtotal).sum();
        let shipping_fee = self.load_shipping_rate().await?.fee_for(subtotal);
        let (coupon_code, discount) = self.apply_coupon(&req, subtotal, now).await?;

        let mut order = OrderModel {
            order_id: OrderModel::generate_order_id(),
            customer: req.customer.into(),
            lines,
            amount: req.amount,
            shipping_fee,
            discount,
            coupon_code: coupon_code.clone(),
            partner_code: None,
            partner_commission: None,
            payment_method,
            transaction_id: req.transaction_id,
            status: OrderStatus::Processing,
            tracking_number: None,
            courier_name: None,
            created_at: now,
        };
        order
            .verify_amount()
            .map_err(|e| PlaceOrderUcError::ReqContent(e.detail.unwrap_or_default()))?;

        let accrual = self.resolve_referral(&mut order, req.partner_code).await?;

        // the used count moves first, the rare failure path (order write
        // dies right after) burns one usage, re-submitting a checkout also
        // counts again, both recorded as accepted behavior
        if let Some(code) = coupon_code.as_ref() {
            self.redeem_coupon(code.as_str()).await?;
        }
        self.persist_order(&mut order, accrual).await?;
        self.send_confirmation(&order);

        Ok(OrderCreateRespDto {
            order_id: order.order_id,
            amount: order.amount,
            status: order.status.as_str().to_string(),
            date: order.created_at,
        })
    } // end of fn execute

    fn validate_content(req: &OrderCreateReqDto) -> DefaultResult<(), PlaceOrderUcError> {
        if req.items.is_empty() {
            return Err(PlaceOrderUcError::ReqContent("order-items-empty".to_string()));
        }
        if req.items.len() > MAX_ORDER_LINES_PER_REQUEST {
            return Err(PlaceOrderUcError::ReqContent(
                "order-items-exceed-limit".to_string(),
            ));
        }
        let mut bad_lines = req
            .items
            .iter()
            .filter(|i| i.quantity == 0 || i.price.is_sign_negative() || i.name.trim().is_empty());
        if bad_lines.next().is_some() {
            return Err(PlaceOrderUcError::ReqContent("order-line-invalid".to_string()));
        }
        let c = &req.customer;
        let mut missing = [
            ("name", c.name.as_str()),
            ("email", c.email.as_str()),
            ("phone", c.phone.as_str()),
            ("address", c.address.as_str()),
            ("pincode", c.pincode.as_str()),
        ]
        .into_iter()
        .filter(|(_label, v)| v.trim().is_empty());
        if let Some((label, _v)) = missing.next() {
            return Err(PlaceOrderUcError::ReqContent(format!(
                "customer-field-missing:{label}"
            )));
        }
        Ok(())
    } // end of fn validate_content

    async fn load_shipping_rate(&self) -> DefaultResult<ShippingRateModel, AppError> {
        let maybe_section = self.repo_content.fetch_section(SHIPPING_RATE_SECTION).await?;
        let out = maybe_section
            .as_ref()
            .map(ShippingRateModel::from)
            .unwrap_or_default();
        Ok(out)
    }

    async fn apply_coupon(
        &self,
        req: &OrderCreateReqDto,
        subtotal: Decimal,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<(Option<String>, Decimal), PlaceOrderUcError> {
        match req.coupon_code.as_ref() {
            Some(code) if !code.trim().is_empty() => {
                let uc = ApplyCouponUseCase {
                    repo: self.repo_coupon.as_ref(),
                };
                let applied = uc.execute(code.as_str(), subtotal, now).await.map_err(
                    |e| match e {
                        ApplyCouponUcError::Rejected(r) => PlaceOrderUcError::CouponRejected(r),
                        ApplyCouponUcError::Server(e) => PlaceOrderUcError::Server(vec![e]),
                    },
                )?;
                Ok((Some(applied.code), applied.discount))
            }
            _none_or_blank => Ok((None, Decimal::ZERO)),
        }
    }

    async fn resolve_referral(
        &self,
        order: &mut OrderModel,
        partner_code: Option<String>,
    ) -> DefaultResult<Option<CommissionAccrualModel>, AppError> {
        let code = match partner_code {
            Some(c) if !c.trim().is_empty() => c,
            _others => return Ok(None),
        };
        let found = self.repo_partner.fetch_by_code(code.as_str()).await?;
        match found {
            Some(p) if p.is_active => {
                let commission = p.commission.amount_for(order.amount);
                order.partner_code = Some(p.partner_code.clone());
                order.partner_commission = Some(commission);
                Ok(Some(CommissionAccrualModel {
                    partner_id: p.id,
                    order_amount: order.amount,
                    commission,
                }))
            }
            _unknown_or_suspended => {
                // the order still goes through, only the commission is skipped
                let logctx_p = &self.logctx;
                app_log_event!(
                    logctx_p,
                    AppLogLevel::WARNING,
                    "referral code skipped: {}",
                    code.as_str()
                );
                Ok(None)
            }
        }
    } // end of fn resolve_referral

    async fn redeem_coupon(&self, code: &str) -> DefaultResult<(), PlaceOrderUcError> {
        self.repo_coupon.redeem(code).await.map_err(|e| {
            if matches!(e.code, AppErrorCode::ExceedingMaxLimit) {
                PlaceOrderUcError::CouponRejected(CouponRejectReason::UsageExhausted)
            } else {
                PlaceOrderUcError::Server(vec![e])
            }
        })
    }

    async fn persist_order(
        &self,
        order: &mut OrderModel,
        accrual: Option<CommissionAccrualModel>,
    ) -> DefaultResult<(), PlaceOrderUcError> {
        // the human-readable id generator is random without collision
        // checking, retry with a fresh one when the store reports a clash
        let mut last_error = None;
        for _attempt in 0..MAX_ORDER_ID_ATTEMPTS {
            match self.repo_order.create(order.clone(), accrual.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) if matches!(e.code, AppErrorCode::DuplicateKeyExists) => {
                    order.order_id = OrderModel::generate_order_id();
                    last_error = Some(e);
                }
                Err(e) => return Err(PlaceOrderUcError::Server(vec![e])),
            }
        }
        let e = last_error.unwrap_or(AppError {
            code: AppErrorCode::Unknown,
            detail: Some("order-id-retry".to_string()),
        });
        Err(PlaceOrderUcError::Server(vec![e]))
    } // end of fn persist_order

    fn send_confirmation(&self, order: &OrderModel) {
        let payload = NotifyReqDto {
            order_id: order.order_id.clone(),
            amount: order.amount,
            payment_method: order.payment_method.as_str().to_string(),
            customer: order.customer.clone().into(),
            items: order.lines.iter().cloned().map(Into::into).collect(),
            status: None,
            tracking_number: None,
        };
        dispatch_notification(self.mail_gateway.clone(), self.logctx.clone(), &payload);
    }
} // end of impl PlaceOrderUseCase
