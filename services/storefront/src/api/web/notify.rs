use axum::debug_handler;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;

use super::dto::NotifyReqDto;
use super::resp_ok;
use crate::usecase::SendOrderNotificationUseCase;
use crate::AppSharedState;

// the gateway call is detached, this endpoint answers success as soon as
// the payload parses, a failed delivery only leaves a log line
#[debug_handler(state = AppSharedState)]
pub(super) async fn submit_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<NotifyReqDto>,
) -> impl IntoResponse {
    let uc = SendOrderNotificationUseCase {
        gateway: appstate.mail_gateway(),
        logctx: appstate.log_context().clone(),
    };
    uc.execute(req_body);
    resp_ok(
        HttpStatusCode::OK,
        serde_json::json!({"message": "Notifications processed"}),
    )
}
