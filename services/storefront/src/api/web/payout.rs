use axum::debug_handler;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;
use chrono::Local as LocalTime;

use ecommerce_common::logging::{app_log_event, AppLogLevel};

use super::dto::{PayoutDetailsDto, PayoutRequestCreateReqDto, PayoutReviewReqDto};
use super::partner::uc_error_to_resp as partner_uc_error_to_resp;
use super::{resp_error, resp_ok, resp_server_error};
use crate::repository::{app_repo_partner, app_repo_payout};
use crate::usecase::{
    ListAllPayoutsUseCase, PartnerPayoutDetailsUseCase, PayoutHistoryUseCase, PayoutUcError,
    RequestPayoutUseCase, ReviewPayoutUseCase,
};
use crate::{AppAuthedClaim, AppSharedState};

fn uc_error_to_resp(e: &PayoutUcError) -> (HttpStatusCode, &'static str) {
    match e {
        PayoutUcError::PartnerNotFound => (HttpStatusCode::NOT_FOUND, "Partner not found"),
        PayoutUcError::NotFound => (HttpStatusCode::NOT_FOUND, "Request not found"),
        PayoutUcError::ReqContent(_d) => (HttpStatusCode::BAD_REQUEST, "Invalid amount"),
        PayoutUcError::BelowMinimum => {
            (HttpStatusCode::BAD_REQUEST, "Minimum withdrawal is \u{20b9}500")
        }
        PayoutUcError::InsufficientBalance => (HttpStatusCode::BAD_REQUEST, "Insufficient balance"),
        PayoutUcError::DetailsNotConfigured => (
            HttpStatusCode::BAD_REQUEST,
            "Payout details not configured",
        ),
        PayoutUcError::InvalidTransition(_d) => {
            (HttpStatusCode::BAD_REQUEST, "Invalid status transition")
        }
        PayoutUcError::Server(_e) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn read_details_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let partner_id = match authed.partner_id() {
        Some(v) => v.to_string(),
        None => return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized"),
    };
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = PartnerPayoutDetailsUseCase { repo };
    match uc.read(partner_id.as_str()).await {
        Ok(details) => resp_ok(HttpStatusCode::OK, details),
        Err(e) => {
            let (code, msg) = partner_uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn edit_details_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PayoutDetailsDto>,
) -> impl IntoResponse {
    let partner_id = match authed.partner_id() {
        Some(v) => v.to_string(),
        None => return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized"),
    };
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = PartnerPayoutDetailsUseCase { repo };
    match uc.write(partner_id.as_str(), req_body).await {
        Ok(details) => resp_ok(HttpStatusCode::OK, details),
        Err(e) => {
            let (code, msg) = partner_uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn history_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let partner_id = match authed.partner_id() {
        Some(v) => v.to_string(),
        None => return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized"),
    };
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_payout(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = PayoutHistoryUseCase { repo };
    match uc.execute(partner_id.as_str()).await {
        Ok(items) => resp_ok(HttpStatusCode::OK, items),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "payout-history: {e}");
            resp_server_error()
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn request_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PayoutRequestCreateReqDto>,
) -> impl IntoResponse {
    let partner_id = match authed.partner_id() {
        Some(v) => v.to_string(),
        None => return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized"),
    };
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let results = (
        app_repo_partner(ds.clone()).await,
        app_repo_payout(ds).await,
    );
    let (repo_partner, repo_payout) = match results {
        (Ok(a), Ok(b)) => (a, b),
        _any_failed => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init failure");
            return resp_server_error();
        }
    };
    let uc = RequestPayoutUseCase {
        repo_partner,
        repo_payout,
    };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(partner_id.as_str(), req_body, now).await {
        Ok(created) => resp_ok(HttpStatusCode::OK, created),
        Err(e) => {
            if let PayoutUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "payout-request: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg)
        }
    }
} // end of fn request_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn admin_list_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let results = (
        app_repo_payout(ds.clone()).await,
        app_repo_partner(ds).await,
    );
    let (repo_payout, repo_partner) = match results {
        (Ok(a), Ok(b)) => (a, b),
        _any_failed => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init failure");
            return resp_server_error();
        }
    };
    let uc = ListAllPayoutsUseCase {
        repo_payout,
        repo_partner,
    };
    match uc.execute().await {
        Ok(items) => resp_ok(HttpStatusCode::OK, items),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "payout-list: {e}");
            resp_server_error()
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn admin_review_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PayoutReviewReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_payout(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = ReviewPayoutUseCase { repo };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(updated) => resp_ok(HttpStatusCode::OK, updated),
        Err(e) => {
            if let PayoutUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "payout-review: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg)
        }
    }
} // end of fn admin_review_handler
