use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use ecommerce_common::error::AppErrorCode;

use crate::error::AppError;
use crate::model::{
    ContentSectionModel, CouponModel, OrderModel, OrderStatus, PartnerModel, PayoutDetailsModel,
    PayoutRequestModel, PayoutState, ProductModel,
};
use crate::AppDataStoreContext;

mod in_mem;
// make in-memory repos visible for testing purpose
pub use in_mem::content::ContentInMemRepo;
pub use in_mem::coupon::CouponInMemRepo;
pub use in_mem::order::OrderInMemRepo;
pub use in_mem::partner::PartnerInMemRepo;
pub use in_mem::payout::PayoutInMemRepo;
pub use in_mem::product::ProductInMemRepo;

#[cfg(feature = "mariadb")]
mod mariadb;

#[cfg(feature = "mariadb")]
use mariadb::content::ContentMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::coupon::CouponMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::order::OrderMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::partner::PartnerMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::payout::PayoutMariaDbRepo;
#[cfg(feature = "mariadb")]
use mariadb::product::ProductMariaDbRepo;

// the repository instance may be used across an await, the future created
// by app callers has to be able to pass to different threads, it is the
// reason to add `Send` and `Sync` as super-traits

#[async_trait]
pub trait AbsCouponRepo: Sync + Send {
    /// rejects with `DuplicateKeyExists` when the normalized code is taken
    async fn create(&self, item: CouponModel) -> DefaultResult<(), AppError>;
    async fn fetch(&self, id: &str) -> DefaultResult<Option<CouponModel>, AppError>;
    async fn fetch_by_code(&self, code: &str) -> DefaultResult<Option<CouponModel>, AppError>;
    // all coupons, most recently created first
    async fn fetch_all(&self) -> DefaultResult<Vec<CouponModel>, AppError>;
    async fn update(&self, item: CouponModel) -> DefaultResult<(), AppError>;
    async fn delete(&self, id: &str) -> DefaultResult<(), AppError>;
    /// single atomic used-count increment, the usage limit is re-checked
    /// inside the same operation so concurrent checkouts cannot overshoot
    async fn redeem(&self, code: &str) -> DefaultResult<(), AppError>;
}

/// aggregate update applied to a partner record together with the order
/// write at checkout
#[derive(Clone)]
pub struct CommissionAccrualModel {
    pub partner_id: String,
    pub order_amount: Decimal,
    pub commission: Decimal,
}

#[async_trait]
pub trait AbsPartnerRepo: Sync + Send {
    /// rejects with `DuplicateKeyExists` on a taken code or email
    async fn create(&self, item: PartnerModel) -> DefaultResult<(), AppError>;
    async fn fetch(&self, id: &str) -> DefaultResult<Option<PartnerModel>, AppError>;
    async fn fetch_by_email(&self, email: &str) -> DefaultResult<Option<PartnerModel>, AppError>;
    async fn fetch_by_code(&self, code: &str) -> DefaultResult<Option<PartnerModel>, AppError>;
    async fn fetch_all(&self, active_only: bool) -> DefaultResult<Vec<PartnerModel>, AppError>;
    /// overwrites profile fields only, running aggregates kept from the
    /// stored record
    async fn update_profile(&self, item: PartnerModel) -> DefaultResult<(), AppError>;
    async fn delete(&self, id: &str) -> DefaultResult<(), AppError>;
    async fn save_password(&self, id: &str, hash: String) -> DefaultResult<(), AppError>;
    async fn update_payout_details(
        &self,
        id: &str,
        details: PayoutDetailsModel,
    ) -> DefaultResult<(), AppError>;
    /// atomic login-count increment plus last-login timestamp
    async fn record_login(
        &self,
        id: &str,
        at: DateTime<FixedOffset>,
    ) -> DefaultResult<(), AppError>;
}

#[async_trait]
pub trait AbsOrderRepo: Sync + Send {
    /// order write and commission accrual are one atomic operation, a
    /// failure leaves neither applied
    async fn create(
        &self,
        order: OrderModel,
        accrual: Option<CommissionAccrualModel>,
    ) -> DefaultResult<(), AppError>;
    // all orders, most recent first
    async fn fetch_all(&self) -> DefaultResult<Vec<OrderModel>, AppError>;
    async fn fetch_by_id(&self, order_id: &str) -> DefaultResult<Option<OrderModel>, AppError>;
    async fn update_fulfillment(
        &self,
        order_id: &str,
        status: Option<OrderStatus>,
        tracking_number: Option<String>,
        courier_name: Option<String>,
    ) -> DefaultResult<OrderModel, AppError>;
    async fn fetch_by_partner_code(
        &self,
        code: &str,
        since: Option<DateTime<FixedOffset>>,
    ) -> DefaultResult<Vec<OrderModel>, AppError>;
}

#[async_trait]
pub trait AbsPayoutRepo: Sync + Send {
    async fn create(&self, item: PayoutRequestModel) -> DefaultResult<(), AppError>;
    async fn fetch(&self, id: &str) -> DefaultResult<Option<PayoutRequestModel>, AppError>;
    async fn fetch_all(&self) -> DefaultResult<Vec<PayoutRequestModel>, AppError>;
    async fn fetch_by_partner(
        &self,
        partner_id: &str,
    ) -> DefaultResult<Vec<PayoutRequestModel>, AppError>;
    /// state transition applied atomically against the stored record,
    /// `PayoutState::can_transit_to` decides validity
    async fn update_review(
        &self,
        id: &str,
        next: PayoutState,
        admin_notes: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PayoutRequestModel, AppError>;
    /// sum of request amounts currently held against the partner balance
    /// (states where `PayoutState::holds_balance` is true)
    async fn sum_reserved_amount(&self, partner_id: &str) -> DefaultResult<Decimal, AppError>;
}

#[async_trait]
pub trait AbsContentRepo: Sync + Send {
    async fn fetch_section(
        &self,
        section: &str,
    ) -> DefaultResult<Option<ContentSectionModel>, AppError>;
    async fn fetch_all(&self) -> DefaultResult<Vec<ContentSectionModel>, AppError>;
    async fn upsert(&self, section: ContentSectionModel) -> DefaultResult<(), AppError>;
}

#[async_trait]
pub trait AbsProductRepo: Sync + Send {
    async fn create(&self, item: ProductModel) -> DefaultResult<(), AppError>;
    async fn fetch(&self, id: &str) -> DefaultResult<Option<ProductModel>, AppError>;
    async fn fetch_all(&self, active_only: bool) -> DefaultResult<Vec<ProductModel>, AppError>;
    async fn update(&self, item: ProductModel) -> DefaultResult<(), AppError>;
}

macro_rules! build_repo {
    ($fn_name:ident, $trait_name:ident, $inmem_type:ident, $sql_type:ident) => {
        pub async fn $fn_name(
            ds: Arc<AppDataStoreContext>,
        ) -> DefaultResult<Box<dyn $trait_name>, AppError> {
            #[cfg(feature = "mariadb")]
            if let Some(dbs) = ds.sql_dbs.as_ref() {
                let obj = $sql_type::new(dbs.clone())?;
                Ok(Box::new(obj))
            } else {
                Err(AppError {
                    code: AppErrorCode::FeatureDisabled,
                    detail: Some("mariadb".to_string()),
                })
            }
            #[cfg(not(feature = "mariadb"))]
            if let Some(m) = ds.in_mem.as_ref() {
                let obj = $inmem_type::new(m.clone()).await?;
                Ok(Box::new(obj))
            } else {
                Err(AppError {
                    code: AppErrorCode::MissingDataStore,
                    detail: Some("in-mem".to_string()),
                })
            }
        }
    };
}

build_repo!(app_repo_coupon, AbsCouponRepo, CouponInMemRepo, CouponMariaDbRepo);
build_repo!(
    app_repo_partner,
    AbsPartnerRepo,
    PartnerInMemRepo,
    PartnerMariaDbRepo
);
build_repo!(app_repo_order, AbsOrderRepo, OrderInMemRepo, OrderMariaDbRepo);
build_repo!(app_repo_payout, AbsPayoutRepo, PayoutInMemRepo, PayoutMariaDbRepo);
build_repo!(
    app_repo_content,
    AbsContentRepo,
    ContentInMemRepo,
    ContentMariaDbRepo
);
build_repo!(
    app_repo_product,
    AbsProductRepo,
    ProductInMemRepo,
    ProductMariaDbRepo
);
