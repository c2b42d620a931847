use axum::debug_handler;
use axum::extract::{
    Json as ExtractJson, Path as ExtractPath, Query as ExtractQuery, State as ExtractState,
};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;
use chrono::Local as LocalTime;
use serde::Deserialize;

use ecommerce_common::logging::{app_log_event, AppLogLevel};

use super::dto::{PartnerCreateReqDto, PartnerUpdateReqDto, SetPasswordReqDto};
use super::{resp_error, resp_ok, resp_server_error};
use crate::repository::{app_repo_order, app_repo_partner, app_repo_payout};
use crate::usecase::{
    CreatePartnerUseCase, EditPartnerUseCase, GetPartnerUseCase, ListPartnersUseCase,
    PartnerStatsUseCase, PartnerUcError, RemovePartnerUseCase, SetPartnerPasswordUseCase,
};
use crate::{AppAuthedClaim, AppSharedState};

#[derive(Deserialize)]
pub(super) struct PartnerListFilter {
    active: Option<String>,
}

pub(super) fn uc_error_to_resp(e: &PartnerUcError) -> (HttpStatusCode, String) {
    match e {
        PartnerUcError::NotFound => (HttpStatusCode::NOT_FOUND, "Partner not found".to_string()),
        PartnerUcError::Duplicate(which) => {
            let msg = if which.contains("email") {
                "Email already registered"
            } else {
                "Partner code already exists"
            };
            (HttpStatusCode::BAD_REQUEST, msg.to_string())
        }
        PartnerUcError::ReqContent(d) => (HttpStatusCode::BAD_REQUEST, d.clone()),
        PartnerUcError::Server(_e) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn list_handler(
    authed: AppAuthedClaim,
    filter: ExtractQuery<PartnerListFilter>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let active_only = filter
        .active
        .as_ref()
        .map(|v| v.as_str() == "true")
        .unwrap_or(false);
    let uc = ListPartnersUseCase { repo };
    match uc.execute(active_only).await {
        Ok(items) => resp_ok(HttpStatusCode::OK, items),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "list-partners: {e}");
            resp_server_error()
        }
    }
} // end of fn list_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn create_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PartnerCreateReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = CreatePartnerUseCase { repo };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(created) => resp_ok(HttpStatusCode::CREATED, created),
        Err(e) => {
            if let PartnerUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "create-partner: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
} // end of fn create_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn fetch_handler(
    ExtractPath(partner_id): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = GetPartnerUseCase { repo };
    match uc.execute(partner_id).await {
        Ok(found) => resp_ok(HttpStatusCode::OK, found),
        Err(e) => {
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn edit_handler(
    ExtractPath(partner_id): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PartnerUpdateReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = EditPartnerUseCase { repo };
    match uc.execute(partner_id, req_body).await {
        Ok(updated) => resp_ok(HttpStatusCode::OK, updated),
        Err(e) => {
            if let PartnerUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "edit-partner: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
} // end of fn edit_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn remove_handler(
    ExtractPath(partner_id): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = RemovePartnerUseCase { repo };
    match uc.execute(partner_id).await {
        Ok(()) => resp_ok(HttpStatusCode::OK, serde_json::json!({})),
        Err(e) => {
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn set_password_handler(
    ExtractPath(partner_id): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<SetPasswordReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = SetPartnerPasswordUseCase { repo };
    match uc.execute(partner_id, req_body.password).await {
        Ok(()) => resp_ok(HttpStatusCode::OK, serde_json::json!({})),
        Err(e) => {
            if let PartnerUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "set-password: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
} // end of fn set_password_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn own_profile_handler(
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
    let uc = GetPartnerUseCase { repo };
    match uc.execute(partner_id).await {
        Ok(found) => resp_ok(HttpStatusCode::OK, found),
        Err(e) => {
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn stats_handler(
    ExtractPath(partner_id): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    // admins inspect any partner, a partner may read their own numbers
    let permitted = authed.is_admin()
        || authed
            .partner_id()
            .map(|pid| pid == partner_id.as_str())
            .unwrap_or(false);
    if !permitted {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    let results = (
        app_repo_partner(ds.clone()).await,
        app_repo_order(ds.clone()).await,
        app_repo_payout(ds).await,
    );
    let (repo_partner, repo_order, repo_payout) = match results {
        (Ok(a), Ok(b), Ok(c)) => (a, b, c),
        _any_failed => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init failure");
            return resp_server_error();
        }
    };
    let uc = PartnerStatsUseCase {
        repo_partner,
        repo_order,
        repo_payout,
    };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(partner_id.as_str(), now).await {
        Ok(stats) => resp_ok(HttpStatusCode::OK, stats),
        Err(e) => {
            if let PartnerUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "partner-stats: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg.as_str())
        }
    }
} // end of fn stats_handler
