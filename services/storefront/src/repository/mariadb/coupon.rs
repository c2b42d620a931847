use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Acquire, Arguments, Row};

use ecommerce_common::error::AppErrorCode;

use super::super::AbsCouponRepo;
use super::{col_datetime, col_opt_datetime, fetch_all_rows, fetch_one_row, run_query_once};
use crate::datastore::AppMariaDbStore;
use crate::error::AppError;
use crate::model::{CouponDiscountModel, CouponModel};

struct InsertArg<'a>(&'a CouponModel);
struct UpdateArg<'a>(&'a CouponModel);
struct DeleteArg<'a>(&'a str);
struct FetchByIdArg<'a>(&'a str);
struct FetchByCodeArg(String);
struct RedeemArg(String);

impl<'a> From<InsertArg<'a>> for (String, MySqlArguments) {
    fn from(value: InsertArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "INSERT INTO `coupon`(`id`,`code`,`discount_type`,`discount_value`,\
             `min_order_value`,`expiration_date`,`usage_limit`,`used_count`,`is_active`,\
             `sent_to`,`created_at`) VALUES (?,?,?,?,?,?,?,?,?,?,?)";
        let m = value.0;
        let mut args = MySqlArguments::default();
        args.add(m.id.as_str());
        args.add(m.code.as_str());
        args.add(m.discount.type_label());
        args.add(m.discount.value());
        args.add(m.min_order_value);
        args.add(m.expiration_date.map(|t| t.to_rfc3339()));
        args.add(m.usage_limit);
        args.add(m.used_count);
        args.add(m.is_active);
        args.add(m.sent_to.clone());
        args.add(m.created_at.to_rfc3339());
        (sql_patt.to_string(), args)
    }
}

// `used_count` moves only through the redeem statement below
impl<'a> From<UpdateArg<'a>> for (String, MySqlArguments) {
    fn from(value: UpdateArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "UPDATE `coupon` SET `discount_type`=?,`discount_value`=?,\
             `min_order_value`=?,`expiration_date`=?,`usage_limit`=?,`is_active`=?,\
             `sent_to`=? WHERE `id`=?";
        let m = value.0;
        let mut args = MySqlArguments::default();
        args.add(m.discount.type_label());
        args.add(m.discount.value());
        args.add(m.min_order_value);
        args.add(m.expiration_date.map(|t| t.to_rfc3339()));
        args.add(m.usage_limit);
        args.add(m.is_active);
        args.add(m.sent_to.clone());
        args.add(m.id.as_str());
        (sql_patt.to_string(), args)
    }
}

impl<'a> From<DeleteArg<'a>> for (String, MySqlArguments) {
    fn from(value: DeleteArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "DELETE FROM `coupon` WHERE `id`=?";
        let mut args = MySqlArguments::default();
        args.add(value.0);
        (sql_patt.to_string(), args)
    }
}

const SELECT_COLUMNS: &str = "`id`,`code`,`discount_type`,`discount_value`,`min_order_value`,\
     `expiration_date`,`usage_limit`,`used_count`,`is_active`,`sent_to`,`created_at`";

impl<'a> From<FetchByIdArg<'a>> for (String, MySqlArguments) {
    fn from(value: FetchByIdArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = format!("SELECT {SELECT_COLUMNS} FROM `coupon` WHERE `id`=?");
        let mut args = MySqlArguments::default();
        args.add(value.0);
        (sql_patt, args)
    }
}
impl From<FetchByCodeArg> for (String, MySqlArguments) {
    fn from(value: FetchByCodeArg) -> (String, MySqlArguments) {
        let sql_patt = format!("SELECT {SELECT_COLUMNS} FROM `coupon` WHERE `code`=?");
        let mut args = MySqlArguments::default();
        args.add(value.0);
        (sql_patt, args)
    }
}

// the usage limit is re-checked inside the UPDATE itself, concurrent
// checkouts cannot push `used_count` past the limit
impl From<RedeemArg> for (String, MySqlArguments) {
    fn from(value: RedeemArg) -> (String, MySqlArguments) {
        let sql_patt = "UPDATE `coupon` SET `used_count`=`used_count`+1 WHERE `code`=? \
             AND `is_active`=1 AND (`usage_limit` IS NULL OR `used_count` < `usage_limit`)";
        let mut args = MySqlArguments::default();
        args.add(value.0);
        (sql_patt.to_string(), args)
    }
}

fn to_model(row: &MySqlRow) -> DefaultResult<CouponModel, AppError> {
    let discount = CouponDiscountModel::try_from_parts(
        row.try_get::<String, usize>(2)?.as_str(),
        row.try_get(3)?,
    )?;
    Ok(CouponModel {
        id: row.try_get(0)?,
        code: row.try_get(1)?,
        discount,
        min_order_value: row.try_get(4)?,
        expiration_date: col_opt_datetime(row, 5)?,
        usage_limit: row.try_get(6)?,
        used_count: row.try_get(7)?,
        is_active: row.try_get(8)?,
        sent_to: row.try_get(9)?,
        created_at: col_datetime(row, 10)?,
    })
}

pub(crate) struct CouponMariaDbRepo {
    db: Arc<AppMariaDbStore>,
}

impl CouponMariaDbRepo {
    pub(crate) fn new(dbs: Vec<Arc<AppMariaDbStore>>) -> DefaultResult<Self, AppError> {
        let db = dbs.first().cloned().ok_or(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { db })
    }

    async fn fetch_with(
        &self,
        sql_and_args: (String, MySqlArguments),
    ) -> DefaultResult<Option<CouponModel>, AppError> {
        let mut conn = self.db.acquire().await?;
        let maybe_row = fetch_one_row(&mut conn, sql_and_args.0, sql_and_args.1).await?;
        match maybe_row {
            Some(row) => Ok(Some(to_model(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AbsCouponRepo for CouponMariaDbRepo {
    async fn create(&self, item: CouponModel) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = InsertArg(&item).into();
        let _rs = run_query_once(&mut tx, sql_patt, args, Some(1)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> DefaultResult<Option<CouponModel>, AppError> {
        self.fetch_with(FetchByIdArg(id).into()).await
    }

    async fn fetch_by_code(&self, code: &str) -> DefaultResult<Option<CouponModel>, AppError> {
        let code = CouponModel::normalize_code(code);
        self.fetch_with(FetchByCodeArg(code).into()).await
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<CouponModel>, AppError> {
        let mut conn = self.db.acquire().await?;
        let sql_patt = format!(
            "SELECT {SELECT_COLUMNS} FROM `coupon` ORDER BY `created_at` DESC"
        );
        let rows = fetch_all_rows(&mut conn, sql_patt, MySqlArguments::default()).await?;
        rows.iter().map(to_model).collect()
    }

    async fn update(&self, item: CouponModel) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = UpdateArg(&item).into();
        let rs = run_query_once(&mut tx, sql_patt, args, None).await?;
        tx.commit().await?;
        if rs.rows_affected() == 0 {
            // the row may also exist with identical values, treated as
            // missing only when it truly is
            if self.fetch(item.id.as_str()).await?.is_none() {
                return Err(AppError {
                    code: AppErrorCode::ObjectNotExist,
                    detail: Some(format!("coupon:{}", item.id)),
                });
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = DeleteArg(id).into();
        let rs = run_query_once(&mut tx, sql_patt, args, None).await?;
        tx.commit().await?;
        if rs.rows_affected() == 0 {
            Err(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("coupon:{id}")),
            })
        } else {
            Ok(())
        }
    }

    async fn redeem(&self, code: &str) -> DefaultResult<(), AppError> {
        let code = CouponModel::normalize_code(code);
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = RedeemArg(code.clone()).into();
        let rs = run_query_once(&mut tx, sql_patt, args, None).await?;
        tx.commit().await?;
        if rs.rows_affected() == 0 {
            Err(AppError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: Some(format!("coupon-usage-limit:{code}")),
            })
        } else {
            Ok(())
        }
    }
} // end of impl AbsCouponRepo for CouponMariaDbRepo
