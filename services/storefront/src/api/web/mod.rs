use std::collections::HashMap;

use axum::http::{
    header as HttpHeader, HeaderMap as HttpHeaderMap, HeaderValue as HttpHeaderValue,
    StatusCode as HttpStatusCode,
};
use axum::routing::{get, post, put, MethodRouter};
use http_body::Body as HttpBody;
use serde::Serialize;

use crate::constant::api::web as WebConst;
use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::{AppSharedState, WebApiHdlrLabel};

mod content;
mod coupon;
pub mod dto;
mod login;
mod notify;
mod order;
mod partner;
mod payout;
mod product;

use dto::{RespErrorEnvelope, RespOkEnvelope};

// type parameter `HB` for http body of the method router has to match the
// same type parameter in `axum::Router`
pub type ApiRouteType<HB> = MethodRouter<AppSharedState, HB>;
pub type ApiRouteTableType<HB> = HashMap<WebApiHdlrLabel, ApiRouteType<HB>>;

pub fn route_table<HB>() -> ApiRouteTableType<HB>
where
    HB: HttpBody + Send + 'static,
    <HB as HttpBody>::Data: Send,
    <HB as HttpBody>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut out: ApiRouteTableType<HB> = HashMap::new();
    out.insert(
        WebConst::PARTNER_COLLECTION,
        get(partner::list_handler).post(partner::create_handler),
    );
    out.insert(
        WebConst::PARTNER_SINGLE,
        get(partner::fetch_handler)
            .put(partner::edit_handler)
            .delete(partner::remove_handler),
    );
    out.insert(
        WebConst::PARTNER_SET_PASSWORD,
        post(partner::set_password_handler),
    );
    out.insert(
        WebConst::PARTNER_OWN_PROFILE,
        get(partner::own_profile_handler),
    );
    out.insert(WebConst::PARTNER_STATISTICS, get(partner::stats_handler));
    out.insert(
        WebConst::PARTNER_PAYOUT_DETAILS,
        get(payout::read_details_handler).put(payout::edit_details_handler),
    );
    out.insert(
        WebConst::PARTNER_PAYOUT_REQUESTS,
        get(payout::history_handler).post(payout::request_handler),
    );
    out.insert(WebConst::PARTNER_LOGIN, post(login::partner_login_handler));
    out.insert(WebConst::ADMIN_LOGIN, post(login::admin_login_handler));
    out.insert(
        WebConst::ADMIN_PAYOUT_REVIEW,
        get(payout::admin_list_handler).put(payout::admin_review_handler),
    );
    out.insert(
        WebConst::COUPON_COLLECTION,
        get(coupon::list_handler).post(coupon::create_handler),
    );
    out.insert(
        WebConst::COUPON_SINGLE,
        put(coupon::edit_handler).delete(coupon::remove_handler),
    );
    out.insert(
        WebConst::ORDER_COLLECTION,
        get(order::list_handler)
            .put(order::edit_handler)
            .post(order::create_handler),
    );
    out.insert(
        WebConst::PRODUCT_COLLECTION,
        get(product::list_handler)
            .post(product::create_handler)
            .put(product::edit_handler),
    );
    out.insert(
        WebConst::SITE_CONTENT,
        get(content::read_handler).put(content::edit_handler),
    );
    out.insert(WebConst::ORDER_NOTIFICATION, post(notify::submit_handler));
    out
} // end of fn route_table

type WebApiRespPayload = (HttpStatusCode, HttpHeaderMap, String);

fn json_resp_header() -> HttpHeaderMap {
    let mut hdr_map = HttpHeaderMap::new();
    // the content-type value is a valid constant, `from_str` cannot fail
    if let Ok(v) = HttpHeaderValue::from_str(HTTP_CONTENT_TYPE_JSON) {
        hdr_map.insert(HttpHeader::CONTENT_TYPE, v);
    }
    hdr_map
}

fn resp_ok<T: Serialize>(code: HttpStatusCode, data: T) -> WebApiRespPayload {
    let envelope = RespOkEnvelope {
        success: true,
        data,
    };
    match serde_json::to_string(&envelope) {
        Ok(serial) => (code, json_resp_header(), serial),
        Err(_e) => resp_server_error(),
    }
}

fn resp_error(code: HttpStatusCode, msg: &str) -> WebApiRespPayload {
    let envelope = RespErrorEnvelope {
        success: false,
        error: msg.to_string(),
    };
    let serial = serde_json::to_string(&envelope)
        .unwrap_or(r#"{"success":false,"error":"Internal server error"}"#.to_string());
    (code, json_resp_header(), serial)
}

fn resp_server_error() -> WebApiRespPayload {
    (
        HttpStatusCode::INTERNAL_SERVER_ERROR,
        json_resp_header(),
        r#"{"success":false,"error":"Internal server error"}"#.to_string(),
    )
}
