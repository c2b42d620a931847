use axum::debug_handler;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;
use chrono::Local as LocalTime;

use ecommerce_common::logging::{app_log_event, AppLogLevel};

use super::dto::{AdminLoginReqDto, PartnerLoginReqDto};
use super::{resp_error, resp_ok, resp_server_error};
use crate::repository::app_repo_partner;
use crate::usecase::{AdminLoginUseCase, LoginUcError, PartnerLoginUseCase};
use crate::AppSharedState;

fn login_error_to_resp(e: &LoginUcError) -> (HttpStatusCode, &'static str) {
    match e {
        LoginUcError::BadCredential => (HttpStatusCode::UNAUTHORIZED, "Invalid credentials"),
        LoginUcError::AccessDisabled => (
            HttpStatusCode::FORBIDDEN,
            "Account access not enabled. Contact admin.",
        ),
        LoginUcError::Suspended => (
            HttpStatusCode::FORBIDDEN,
            "Account is inactive. Contact admin.",
        ),
        LoginUcError::PasswordNotSet => (
            HttpStatusCode::FORBIDDEN,
            "Password not set. Contact admin.",
        ),
        LoginUcError::Server(_e) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn partner_login_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PartnerLoginReqDto>,
) -> impl IntoResponse {
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_partner(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = PartnerLoginUseCase {
        repo,
        keystore: appstate.auth_keystore(),
    };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(resp) => resp_ok(HttpStatusCode::OK, resp),
        Err(e) => {
            if let LoginUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "partner-login: {inner}");
            }
            let (code, msg) = login_error_to_resp(&e);
            resp_error(code, msg)
        }
    }
} // end of fn partner_login_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn admin_login_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<AdminLoginReqDto>,
) -> impl IntoResponse {
    let logctx = appstate.log_context().clone();
    let credential_path = appstate
        .config()
        .api_server
        .auth
        .admin_credential_path
        .clone();
    let uc = AdminLoginUseCase {
        confidential: appstate.confidentiality(),
        keystore: appstate.auth_keystore(),
        credential_path,
    };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(resp) => resp_ok(HttpStatusCode::OK, resp),
        Err(e) => {
            if let LoginUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "admin-login: {inner}");
            }
            let (code, msg) = login_error_to_resp(&e);
            resp_error(code, msg)
        }
    }
} // end of fn admin_login_handler
