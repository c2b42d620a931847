use std::boxed::Box;
use std::sync::Arc;

use ecommerce_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::AbstractMailGateway;
use crate::api::web::dto::NotifyReqDto;

/// serialize the payload then hand it to the gateway in a detached task,
/// a failed submission is logged and swallowed, the order record is the
/// source of truth, never the notification (so is the HTTP response of
/// any caller)
pub fn dispatch_notification(
    gateway: Arc<Box<dyn AbstractMailGateway>>,
    logctx: Arc<AppLogContext>,
    payload: &NotifyReqDto,
) {
    let serial = match serde_json::to_vec(payload) {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "notify-serialize: {e}");
            return;
        }
    };
    let order_id = payload.order_id.clone();
    let _handle = tokio::task::spawn(async move {
        if let Err(e) = gateway.submit(serial).await {
            app_log_event!(
                logctx,
                AppLogLevel::WARNING,
                "notification dropped, order:{}, reason:{}",
                order_id.as_str(),
                e
            );
        }
    });
}

pub struct SendOrderNotificationUseCase {
    pub gateway: Arc<Box<dyn AbstractMailGateway>>,
    pub logctx: Arc<AppLogContext>,
}

impl SendOrderNotificationUseCase {
    pub fn execute(self, req: NotifyReqDto) {
        dispatch_notification(self.gateway, self.logctx, &req);
    }
}
