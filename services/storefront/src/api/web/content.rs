use axum::debug_handler;
use axum::extract::{Json as ExtractJson, Query as ExtractQuery, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;
use chrono::Local as LocalTime;
use serde::Deserialize;

use ecommerce_common::logging::{app_log_event, AppLogLevel};

use super::dto::ContentUpdateReqDto;
use super::{resp_error, resp_ok, resp_server_error};
use crate::repository::app_repo_content;
use crate::usecase::{ContentUcError, EditContentUseCase, FetchContentUseCase};
use crate::{AppAuthedClaim, AppSharedState};

#[derive(Deserialize)]
pub(super) struct SectionFilter {
    section: Option<String>,
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn read_handler(
    filter: ExtractQuery<SectionFilter>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_content(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = FetchContentUseCase { repo };
    match uc.execute(filter.0.section).await {
        Ok(flattened) => resp_ok(HttpStatusCode::OK, flattened),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "fetch-content: {e}");
            resp_server_error()
        }
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn edit_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<ContentUpdateReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_content(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = EditContentUseCase { repo };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(()) => resp_ok(HttpStatusCode::OK, serde_json::json!({})),
        Err(e) => match e {
            ContentUcError::ReqContent(d) => resp_error(HttpStatusCode::BAD_REQUEST, d.as_str()),
            ContentUcError::Server(inner) => {
                app_log_event!(logctx, AppLogLevel::ERROR, "edit-content: {inner}");
                resp_server_error()
            }
        },
    }
} // end of fn edit_handler
