use axum::debug_handler;
use axum::extract::{Json as ExtractJson, Path as ExtractPath, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;
use chrono::Local as LocalTime;

use ecommerce_common::logging::{app_log_event, AppLogLevel};

use super::dto::{CouponCreateReqDto, CouponUpdateReqDto};
use super::{resp_error, resp_ok, resp_server_error};
use crate::repository::app_repo_coupon;
use crate::usecase::{
    CouponUcError, CreateCouponUseCase, EditCouponUseCase, ListCouponsUseCase, RemoveCouponUseCase,
};
use crate::{AppAuthedClaim, AppSharedState};

fn uc_error_to_resp(e: CouponUcError) -> (HttpStatusCode, &'static str) {
    match e {
        CouponUcError::NotFound => (HttpStatusCode::NOT_FOUND, "Coupon not found"),
        CouponUcError::CodeTaken => (HttpStatusCode::BAD_REQUEST, "Coupon code already exists"),
        CouponUcError::ReqContent(_d) => (HttpStatusCode::BAD_REQUEST, "Invalid coupon data"),
        CouponUcError::Server(_e) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn list_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_coupon(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = ListCouponsUseCase { repo };
    match uc.execute().await {
        Ok(items) => resp_ok(HttpStatusCode::OK, items),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "list-coupons: {e}");
            resp_server_error()
        }
    }
} // end of fn list_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn create_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<CouponCreateReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_coupon(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = CreateCouponUseCase { repo };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(created) => resp_ok(HttpStatusCode::CREATED, created),
        Err(e) => {
            if let CouponUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "create-coupon: {inner}");
            }
            let (code, msg) = uc_error_to_resp(e);
            resp_error(code, msg)
        }
    }
} // end of fn create_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn edit_handler(
    ExtractPath(coupon_id): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<CouponUpdateReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_coupon(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = EditCouponUseCase { repo };
    match uc.execute(coupon_id, req_body).await {
        Ok(updated) => resp_ok(HttpStatusCode::OK, updated),
        Err(e) => {
            if let CouponUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "edit-coupon: {inner}");
            }
            let (code, msg) = uc_error_to_resp(e);
            resp_error(code, msg)
        }
    }
} // end of fn edit_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn remove_handler(
    ExtractPath(coupon_id): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_coupon(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = RemoveCouponUseCase { repo };
    match uc.execute(coupon_id).await {
        Ok(()) => resp_ok(HttpStatusCode::OK, serde_json::json!({})),
        Err(e) => {
            if let CouponUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "remove-coupon: {inner}");
            }
            let (code, msg) = uc_error_to_resp(e);
            resp_error(code, msg)
        }
    }
} // end of fn remove_handler
