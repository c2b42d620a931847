use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsnVal;

// response envelope preserved from the original storefront API,
// `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`
#[derive(Serialize)]
pub struct RespOkEnvelope<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct RespErrorEnvelope {
    pub success: bool,
    pub error: String,
}

// ---- coupons ----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDto {
    pub id: String,
    pub code: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
    pub expiration_date: Option<DateTime<FixedOffset>>,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub is_active: bool,
    pub sent_to: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCreateReqDto {
    pub code: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_order_value: Option<Decimal>,
    pub expiration_date: Option<DateTime<FixedOffset>>,
    pub usage_limit: Option<u32>,
    pub is_active: Option<bool>,
    pub sent_to: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponUpdateReqDto {
    pub discount_type: Option<String>,
    pub discount_value: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub expiration_date: Option<DateTime<FixedOffset>>,
    pub usage_limit: Option<u32>,
    pub is_active: Option<bool>,
    pub sent_to: Option<String>,
}

// ---- partners ----

#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BankDetailsDto {
    pub account_holder: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
}

#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetailsDto {
    pub upi_id: Option<String>,
    pub bank_details: Option<BankDetailsDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub partner_code: String,
    pub commission_type: String,
    pub commission_value: Decimal,
    pub is_active: bool,
    pub has_access: bool,
    pub login_count: u32,
    pub last_login_at: Option<DateTime<FixedOffset>>,
    pub payout_details: Option<PayoutDetailsDto>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub total_orders: u64,
    pub total_sales: Decimal,
    pub total_commission: Decimal,
    pub created_at: DateTime<FixedOffset>,
}

fn dflt_flag_on() -> bool {
    true
}
fn dflt_commission_type() -> String {
    "percentage".to_string()
}
fn dflt_commission_value() -> Decimal {
    Decimal::from(10u32)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerCreateReqDto {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub partner_code: String,
    #[serde(default = "dflt_commission_type")]
    pub commission_type: String,
    #[serde(default = "dflt_commission_value")]
    pub commission_value: Decimal,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    #[serde(default = "dflt_flag_on")]
    pub is_active: bool,
    pub password: Option<String>,
    #[serde(default = "dflt_flag_on")]
    pub has_access: bool,
}

// aggregate fields (totalOrders / totalSales / totalCommission) are not
// accepted here, the profile update endpoint never touches them
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerUpdateReqDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub partner_code: Option<String>,
    pub commission_type: Option<String>,
    pub commission_value: Option<Decimal>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
    pub has_access: Option<bool>,
}

#[derive(Deserialize)]
pub struct SetPasswordReqDto {
    pub password: String,
}

#[derive(Deserialize)]
pub struct PartnerLoginReqDto {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummaryDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub partner_code: String,
    pub commission_type: String,
    pub commission_value: Decimal,
}

#[derive(Serialize)]
pub struct PartnerLoginRespDto {
    pub token: String,
    pub partner: PartnerSummaryDto,
}

#[derive(Deserialize)]
pub struct AdminLoginReqDto {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AdminLoginRespDto {
    pub token: String,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStatsHeadDto {
    pub name: String,
    pub code: String,
    pub commission_type: String,
    pub commission_value: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerReferredOrderDto {
    pub order_id: String,
    pub amount: Decimal,
    pub commission: Option<Decimal>,
    pub date: DateTime<FixedOffset>,
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatsDto {
    pub orders_this_month: u64,
    pub sales_this_month: Decimal,
    pub commission_this_month: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStatsDto {
    pub partner: PartnerStatsHeadDto,
    pub total_orders: u64,
    pub total_sales: Decimal,
    pub total_commission: Decimal,
    pub available_balance: Decimal,
    pub recent_orders: Vec<PartnerReferredOrderDto>,
    pub monthly_stats: MonthlyStatsDto,
}

// ---- payout requests ----

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PayoutPartnerBriefDto {
    pub name: String,
    pub email: String,
    pub partner_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequestDto {
    pub id: String,
    pub partner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<PayoutPartnerBriefDto>,
    pub amount: Decimal,
    pub status: String,
    pub payout_method: String,
    pub payout_details: PayoutDetailsDto,
    pub admin_notes: Option<String>,
    pub paid_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequestCreateReqDto {
    pub amount: Decimal,
    pub payout_method: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutReviewReqDto {
    pub id: String,
    pub status: String,
    pub admin_notes: Option<String>,
}

// ---- orders ----

#[derive(Deserialize, Serialize, Clone)]
pub struct CustomerContactDto {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub pincode: String,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct OrderItemDto {
    pub id: Option<String>,
    pub name: String,
    // unit price captured at purchase time
    pub price: Decimal,
    pub quantity: u32,
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateReqDto {
    pub customer: CustomerContactDto,
    pub items: Vec<OrderItemDto>,
    pub amount: Decimal,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub coupon_code: Option<String>,
    pub partner_code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRespDto {
    pub order_id: String,
    pub amount: Decimal,
    pub status: String,
    pub date: DateTime<FixedOffset>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub order_id: String,
    pub customer: CustomerContactDto,
    pub items: Vec<OrderItemDto>,
    pub amount: Decimal,
    pub shipping_fee: Decimal,
    pub discount: Decimal,
    pub coupon_code: Option<String>,
    pub partner_code: Option<String>,
    pub partner_commission: Option<Decimal>,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub status: String,
    pub tracking_number: Option<String>,
    pub courier_name: Option<String>,
    pub date: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEditReqDto {
    pub order_id: String,
    pub status: Option<String>,
    pub tracking_number: Option<String>,
    pub courier_name: Option<String>,
}

// ---- products ----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub english_name: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub weight: String,
    pub image: String,
    pub category: String,
    pub tags: Vec<String>,
    pub stock: u32,
    pub rating: Decimal,
    pub reviews: u32,
    pub is_season_best: bool,
    pub is_featured: bool,
    pub is_new_arrival: bool,
    pub is_organic_collection: bool,
    pub is_top_rated: bool,
    pub status: String,
    pub created_at: DateTime<FixedOffset>,
}

fn dflt_weight() -> String {
    "1 kg".to_string()
}
fn dflt_category() -> String {
    "General".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateReqDto {
    pub name: String,
    pub english_name: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    #[serde(default = "dflt_weight")]
    pub weight: String,
    pub image: String,
    #[serde(default = "dflt_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub is_season_best: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new_arrival: bool,
    #[serde(default)]
    pub is_organic_collection: bool,
    #[serde(default)]
    pub is_top_rated: bool,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateReqDto {
    pub id: String,
    pub name: Option<String>,
    pub english_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub weight: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub stock: Option<u32>,
    pub is_season_best: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_new_arrival: Option<bool>,
    pub is_organic_collection: Option<bool>,
    pub is_top_rated: Option<bool>,
    pub status: Option<String>,
}

// ---- content sections ----

#[derive(Deserialize)]
pub struct ContentUpdateReqDto {
    pub section: String,
    pub updates: HashMap<String, JsnVal>,
}

// ---- notifications ----

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReqDto {
    pub order_id: String,
    pub amount: Decimal,
    pub payment_method: String,
    pub customer: CustomerContactDto,
    pub items: Vec<OrderItemDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}
