use axum::debug_handler;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;
use chrono::Local as LocalTime;

use ecommerce_common::logging::{app_log_event, AppLogLevel};

use super::dto::{OrderCreateReqDto, OrderEditReqDto};
use super::{resp_error, resp_ok, resp_server_error};
use crate::repository::{
    app_repo_content, app_repo_coupon, app_repo_order, app_repo_partner,
};
use crate::usecase::{
    EditOrderFulfillmentUseCase, ListOrdersUseCase, OrderEditUcError, PlaceOrderUcError,
    PlaceOrderUseCase,
};
use crate::{AppAuthedClaim, AppSharedState};

#[debug_handler(state = AppSharedState)]
pub(super) async fn list_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_order(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = ListOrdersUseCase { repo };
    match uc.execute().await {
        Ok(items) => resp_ok(HttpStatusCode::OK, items),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "list-orders: {e}");
            resp_server_error()
        }
    }
} // end of fn list_handler

// checkout submission from the public storefront, no bearer token involved
#[debug_handler(state = AppSharedState)]
pub(super) async fn create_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<OrderCreateReqDto>,
) -> impl IntoResponse {
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let results = (
        app_repo_order(ds.clone()).await,
        app_repo_coupon(ds.clone()).await,
        app_repo_partner(ds.clone()).await,
        app_repo_content(ds).await,
    );
    let (repo_order, repo_coupon, repo_partner, repo_content) = match results {
        (Ok(a), Ok(b), Ok(c), Ok(d)) => (a, b, c, d),
        _any_failed => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init failure");
            return resp_server_error();
        }
    };
    let uc = PlaceOrderUseCase {
        repo_order,
        repo_coupon,
        repo_partner,
        repo_content,
        mail_gateway: appstate.mail_gateway(),
        logctx: logctx.clone(),
    };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(created) => resp_ok(HttpStatusCode::CREATED, created),
        Err(e) => match e {
            PlaceOrderUcError::ReqContent(d) => resp_error(HttpStatusCode::BAD_REQUEST, d.as_str()),
            PlaceOrderUcError::CouponRejected(reason) => {
                resp_error(HttpStatusCode::BAD_REQUEST, reason.user_facing_message())
            }
            PlaceOrderUcError::Server(errors) => {
                let msg = errors
                    .into_iter()
                    .map(|e| format!("{:?}", e))
                    .collect::<Vec<_>>()
                    .join(", ");
                app_log_event!(logctx, AppLogLevel::ERROR, "{msg}");
                resp_server_error()
            }
        },
    }
} // end of fn create_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn edit_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<OrderEditReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_order(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = EditOrderFulfillmentUseCase {
        repo,
        mail_gateway: appstate.mail_gateway(),
        logctx: logctx.clone(),
    };
    match uc.execute(req_body).await {
        Ok(updated) => resp_ok(HttpStatusCode::OK, updated),
        Err(e) => match e {
            OrderEditUcError::NotFound => {
                resp_error(HttpStatusCode::NOT_FOUND, "Order not found")
            }
            OrderEditUcError::ReqContent(d) => {
                resp_error(HttpStatusCode::BAD_REQUEST, d.as_str())
            }
            OrderEditUcError::Server(inner) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "edit-order: {inner}");
                resp_server_error()
            }
        },
    }
} // end of fn edit_handler
