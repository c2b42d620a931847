use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use ecommerce_common::error::AppErrorCode;
use ecommerce_common::logging::AppLogContext;

use crate::adapter::AbstractMailGateway;
use crate::api::web::dto::{NotifyReqDto, OrderDto, OrderEditReqDto};
use crate::error::AppError;
use crate::model::OrderStatus;
use crate::repository::AbsOrderRepo;
use crate::usecase::notify_order::dispatch_notification;

pub struct ListOrdersUseCase {
    pub repo: Box<dyn AbsOrderRepo>,
}

impl ListOrdersUseCase {
    pub async fn execute(self) -> DefaultResult<Vec<OrderDto>, AppError> {
        let items = self.repo.fetch_all().await?;
        Ok(items.into_iter().map(OrderDto::from).collect())
    }
}

pub enum OrderEditUcError {
    NotFound,
    ReqContent(String),
    Server(AppError),
}

pub struct EditOrderFulfillmentUseCase {
    pub repo: Box<dyn AbsOrderRepo>,
    pub mail_gateway: Arc<Box<dyn AbstractMailGateway>>,
    pub logctx: Arc<AppLogContext>,
}

impl EditOrderFulfillmentUseCase {
    pub async fn execute(self, req: OrderEditReqDto) -> DefaultResult<OrderDto, OrderEditUcError> {
        if req.order_id.trim().is_empty() {
            return Err(OrderEditUcError::ReqContent("order-id-missing".to_string()));
        }
        if req.status.is_none() && req.tracking_number.is_none() && req.courier_name.is_none() {
            return Err(OrderEditUcError::ReqContent(
                "fulfillment-fields-missing".to_string(),
            ));
        }
        let status = match req.status.as_ref() {
            Some(s) => Some(
                OrderStatus::from_str(s.as_str())
                    .map_err(|e| OrderEditUcError::ReqContent(e.detail.unwrap_or_default()))?,
            ),
            None => None,
        };
        let updated = self
            .repo
            .update_fulfillment(
                req.order_id.as_str(),
                status,
                req.tracking_number,
                req.courier_name,
            )
            .await
            .map_err(|e| {
                if matches!(e.code, AppErrorCode::ObjectNotExist) {
                    OrderEditUcError::NotFound
                } else {
                    OrderEditUcError::Server(e)
                }
            })?;
        // status-update mail for the buyer, fire-and-forget like every
        // other notification
        let payload = NotifyReqDto {
            order_id: updated.order_id.clone(),
            amount: updated.amount,
            payment_method: updated.payment_method.as_str().to_string(),
            customer: updated.customer.clone().into(),
            items: updated.lines.iter().cloned().map(Into::into).collect(),
            status: Some(updated.status.as_str().to_string()),
            tracking_number: updated.tracking_number.clone(),
        };
        dispatch_notification(self.mail_gateway, self.logctx, &payload);
        Ok(updated.into())
    } // end of fn execute
} // end of impl EditOrderFulfillmentUseCase
