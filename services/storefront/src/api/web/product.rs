use axum::debug_handler;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;
use chrono::Local as LocalTime;

use ecommerce_common::logging::{app_log_event, AppLogLevel};

use super::dto::{ProductCreateReqDto, ProductUpdateReqDto};
use super::{resp_error, resp_ok, resp_server_error};
use crate::repository::app_repo_product;
use crate::usecase::{
    CreateProductUseCase, EditProductUseCase, ListProductsUseCase, ProductUcError,
};
use crate::{AppAuthedClaim, AppSharedState};

fn uc_error_to_resp(e: &ProductUcError) -> (HttpStatusCode, &'static str) {
    match e {
        ProductUcError::NotFound => (HttpStatusCode::NOT_FOUND, "Product not found"),
        ProductUcError::ReqContent(_d) => (HttpStatusCode::BAD_REQUEST, "Invalid product data"),
        ProductUcError::Server(_e) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
    }
}

// storefront browsing is anonymous and sees active products only, an
// admin token widens the view to the whole catalog
#[debug_handler(state = AppSharedState)]
pub(super) async fn list_handler(
    authed: Option<AppAuthedClaim>,
    ExtractState(appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let active_only = !authed.map(|a| a.is_admin()).unwrap_or(false);
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_product(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = ListProductsUseCase { repo };
    match uc.execute(active_only).await {
        Ok(items) => resp_ok(HttpStatusCode::OK, items),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "list-products: {e}");
            resp_server_error()
        }
    }
} // end of fn list_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn create_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<ProductCreateReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_product(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = CreateProductUseCase { repo };
    let now = LocalTime::now().fixed_offset();
    match uc.execute(req_body, now).await {
        Ok(created) => resp_ok(HttpStatusCode::CREATED, created),
        Err(e) => {
            if let ProductUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "create-product: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg)
        }
    }
} // end of fn create_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn edit_handler(
    authed: AppAuthedClaim,
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<ProductUpdateReqDto>,
) -> impl IntoResponse {
    if !authed.is_admin() {
        return resp_error(HttpStatusCode::FORBIDDEN, "Access denied");
    }
    let logctx = appstate.log_context().clone();
    let repo = match app_repo_product(appstate.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init: {e}");
            return resp_server_error();
        }
    };
    let uc = EditProductUseCase { repo };
    match uc.execute(req_body).await {
        Ok(updated) => resp_ok(HttpStatusCode::OK, updated),
        Err(e) => {
            if let ProductUcError::Server(inner) = &e {
                app_log_event!(logctx, AppLogLevel::ERROR, "edit-product: {inner}");
            }
            let (code, msg) = uc_error_to_resp(&e);
            resp_error(code, msg)
        }
    }
} // end of fn edit_handler
