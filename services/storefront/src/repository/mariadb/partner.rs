use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Acquire, Arguments, Row};

use ecommerce_common::error::AppErrorCode;

use super::super::AbsPartnerRepo;
use super::{col_datetime, col_opt_datetime, fetch_all_rows, fetch_one_row, run_query_once};
use crate::api::web::dto::PayoutDetailsDto;
use crate::datastore::AppMariaDbStore;
use crate::error::AppError;
use crate::model::{CommissionPolicyModel, PartnerModel, PayoutDetailsModel};

struct InsertArg<'a>(&'a PartnerModel);
struct UpdateProfileArg<'a>(&'a PartnerModel);
struct SavePasswordArg<'a>(&'a str, &'a str);
struct SavePayoutDetailsArg<'a>(&'a str, String);
struct RecordLoginArg<'a>(&'a str, DateTime<FixedOffset>);
struct DeleteArg<'a>(&'a str);

const SELECT_COLUMNS: &str = "`id`,`name`,`email`,`phone`,`partner_code`,`commission_type`,\
     `commission_value`,`is_active`,`has_access`,`password_hash`,`login_count`,`last_login_at`,\
     `payout_details`,`logo`,`description`,`website`,`total_orders`,`total_sales`,\
     `total_commission`,`created_at`";

fn serialize_details(d: &Option<PayoutDetailsModel>) -> DefaultResult<Option<String>, AppError> {
    match d {
        Some(m) => {
            let dto = PayoutDetailsDto::from(m.clone());
            let s = serde_json::to_string(&dto).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?;
            Ok(Some(s))
        }
        None => Ok(None),
    }
}

impl<'a> TryFrom<InsertArg<'a>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: InsertArg<'a>) -> DefaultResult<(String, MySqlArguments), AppError> {
        let sql_patt = "INSERT INTO `partner`(`id`,`name`,`email`,`phone`,`partner_code`,\
             `commission_type`,`commission_value`,`is_active`,`has_access`,`password_hash`,\
             `login_count`,`last_login_at`,`payout_details`,`logo`,`description`,`website`,\
             `total_orders`,`total_sales`,`total_commission`,`created_at`) \
             VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)";
        let m = value.0;
        let mut args = MySqlArguments::default();
        args.add(m.id.as_str());
        args.add(m.name.as_str());
        args.add(m.email.as_str());
        args.add(m.phone.clone());
        args.add(m.partner_code.as_str());
        args.add(m.commission.type_label());
        args.add(m.commission.value());
        args.add(m.is_active);
        args.add(m.has_access);
        args.add(m.password_hash.clone());
        args.add(m.login_count);
        args.add(m.last_login_at.map(|t| t.to_rfc3339()));
        args.add(serialize_details(&m.payout_details)?);
        args.add(m.logo.clone());
        args.add(m.description.clone());
        args.add(m.website.clone());
        args.add(m.total_orders);
        args.add(m.total_sales);
        args.add(m.total_commission);
        args.add(m.created_at.to_rfc3339());
        Ok((sql_patt.to_string(), args))
    }
}

// aggregates, credential, login tracking and payout details are
// intentionally absent from this statement
impl<'a> From<UpdateProfileArg<'a>> for (String, MySqlArguments) {
    fn from(value: UpdateProfileArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "UPDATE `partner` SET `name`=?,`email`=?,`phone`=?,`partner_code`=?,\
             `commission_type`=?,`commission_value`=?,`is_active`=?,`has_access`=?,`logo`=?,\
             `description`=?,`website`=? WHERE `id`=?";
        let m = value.0;
        let mut args = MySqlArguments::default();
        args.add(m.name.as_str());
        args.add(m.email.as_str());
        args.add(m.phone.clone());
        args.add(m.partner_code.as_str());
        args.add(m.commission.type_label());
        args.add(m.commission.value());
        args.add(m.is_active);
        args.add(m.has_access);
        args.add(m.logo.clone());
        args.add(m.description.clone());
        args.add(m.website.clone());
        args.add(m.id.as_str());
        (sql_patt.to_string(), args)
    }
}

impl<'a> From<SavePasswordArg<'a>> for (String, MySqlArguments) {
    fn from(value: SavePasswordArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "UPDATE `partner` SET `password_hash`=? WHERE `id`=?";
        let mut args = MySqlArguments::default();
        args.add(value.1);
        args.add(value.0);
        (sql_patt.to_string(), args)
    }
}

impl<'a> From<SavePayoutDetailsArg<'a>> for (String, MySqlArguments) {
    fn from(value: SavePayoutDetailsArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "UPDATE `partner` SET `payout_details`=? WHERE `id`=?";
        let mut args = MySqlArguments::default();
        args.add(value.1);
        args.add(value.0);
        (sql_patt.to_string(), args)
    }
}

// single-statement increment, lost updates between concurrent logins are
// not possible
impl<'a> From<RecordLoginArg<'a>> for (String, MySqlArguments) {
    fn from(value: RecordLoginArg<'a>) -> (String, MySqlArguments) {
        let sql_patt =
            "UPDATE `partner` SET `login_count`=`login_count`+1,`last_login_at`=? WHERE `id`=?";
        let mut args = MySqlArguments::default();
        args.add(value.1.to_rfc3339());
        args.add(value.0);
        (sql_patt.to_string(), args)
    }
}

impl<'a> From<DeleteArg<'a>> for (String, MySqlArguments) {
    fn from(value: DeleteArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "DELETE FROM `partner` WHERE `id`=?";
        let mut args = MySqlArguments::default();
        args.add(value.0);
        (sql_patt.to_string(), args)
    }
}

pub(super) fn to_model(row: &MySqlRow) -> DefaultResult<PartnerModel, AppError> {
    let commission = CommissionPolicyModel::try_from_parts(
        row.try_get::<String, usize>(5)?.as_str(),
        row.try_get(6)?,
    )?;
    let payout_details = match row.try_get::<Option<String>, usize>(12)? {
        Some(raw) => {
            let dto = serde_json::from_str::<PayoutDetailsDto>(raw.as_str()).map_err(|e| {
                AppError {
                    code: AppErrorCode::DataCorruption,
                    detail: Some(e.to_string()),
                }
            })?;
            Some(PayoutDetailsModel::from(dto))
        }
        None => None,
    };
    Ok(PartnerModel {
        id: row.try_get(0)?,
        name: row.try_get(1)?,
        email: row.try_get(2)?,
        phone: row.try_get(3)?,
        partner_code: row.try_get(4)?,
        commission,
        is_active: row.try_get(7)?,
        has_access: row.try_get(8)?,
        password_hash: row.try_get(9)?,
        login_count: row.try_get(10)?,
        last_login_at: col_opt_datetime(row, 11)?,
        payout_details,
        logo: row.try_get(13)?,
        description: row.try_get(14)?,
        website: row.try_get(15)?,
        total_orders: row.try_get(16)?,
        total_sales: row.try_get(17)?,
        total_commission: row.try_get(18)?,
        created_at: col_datetime(row, 19)?,
    })
} // end of fn to_model

pub(crate) struct PartnerMariaDbRepo {
    db: Arc<AppMariaDbStore>,
}

impl PartnerMariaDbRepo {
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
    ) -> DefaultResult<Option<PartnerModel>, AppError> {
        let mut conn = self.db.acquire().await?;
        let maybe_row = fetch_one_row(&mut conn, sql_and_args.0, sql_and_args.1).await?;
        match maybe_row {
            Some(row) => Ok(Some(to_model(&row)?)),
            None => Ok(None),
        }
    }

    async fn run_single_update(
        &self,
        sql_and_args: (String, MySqlArguments),
        missing_detail: String,
    ) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let rs = run_query_once(&mut tx, sql_and_args.0, sql_and_args.1, None).await?;
        tx.commit().await?;
        if rs.rows_affected() == 0 {
            Err(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(missing_detail),
            })
        } else {
            Ok(())
        }
    }
} // end of impl PartnerMariaDbRepo

#[async_trait]
impl AbsPartnerRepo for PartnerMariaDbRepo {
    async fn create(&self, item: PartnerModel) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = InsertArg(&item).try_into()?;
        let _rs = run_query_once(&mut tx, sql_patt, args, Some(1)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> DefaultResult<Option<PartnerModel>, AppError> {
        let sql_patt = format!("SELECT {SELECT_COLUMNS} FROM `partner` WHERE `id`=?");
        let mut args = MySqlArguments::default();
        args.add(id);
        self.fetch_with((sql_patt, args)).await
    }

    async fn fetch_by_email(&self, email: &str) -> DefaultResult<Option<PartnerModel>, AppError> {
        let email = PartnerModel::normalize_email(email);
        let sql_patt = format!("SELECT {SELECT_COLUMNS} FROM `partner` WHERE `email`=?");
        let mut args = MySqlArguments::default();
        args.add(email);
        self.fetch_with((sql_patt, args)).await
    }

    async fn fetch_by_code(&self, code: &str) -> DefaultResult<Option<PartnerModel>, AppError> {
        let code = PartnerModel::normalize_code(code);
        let sql_patt = format!("SELECT {SELECT_COLUMNS} FROM `partner` WHERE `partner_code`=?");
        let mut args = MySqlArguments::default();
        args.add(code);
        self.fetch_with((sql_patt, args)).await
    }

    async fn fetch_all(&self, active_only: bool) -> DefaultResult<Vec<PartnerModel>, AppError> {
        let mut conn = self.db.acquire().await?;
        let sql_patt = if active_only {
            format!(
                "SELECT {SELECT_COLUMNS} FROM `partner` WHERE `is_active`=1 \
                 ORDER BY `created_at` DESC"
            )
        } else {
            format!("SELECT {SELECT_COLUMNS} FROM `partner` ORDER BY `created_at` DESC")
        };
        let rows = fetch_all_rows(&mut conn, sql_patt, MySqlArguments::default()).await?;
        rows.iter().map(to_model).collect()
    }

    async fn update_profile(&self, item: PartnerModel) -> DefaultResult<(), AppError> {
        let detail = format!("partner:{}", item.id);
        let sql_and_args = UpdateProfileArg(&item).into();
        match self.run_single_update(sql_and_args, detail).await {
            Ok(()) => Ok(()),
            // zero affected rows also happens when the submitted profile
            // equals the stored one
            Err(e) if matches!(e.code, AppErrorCode::ObjectNotExist) => {
                if self.fetch(item.id.as_str()).await?.is_some() {
                    Ok(())
                } else {
                    Err(e)
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, id: &str) -> DefaultResult<(), AppError> {
        self.run_single_update(DeleteArg(id).into(), format!("partner:{id}"))
            .await
    }

    async fn save_password(&self, id: &str, hash: String) -> DefaultResult<(), AppError> {
        self.run_single_update(
            SavePasswordArg(id, hash.as_str()).into(),
            format!("partner:{id}"),
        )
        .await
    }

    async fn update_payout_details(
        &self,
        id: &str,
        details: PayoutDetailsModel,
    ) -> DefaultResult<(), AppError> {
        let dto = PayoutDetailsDto::from(details);
        let serial = serde_json::to_string(&dto).map_err(|e| AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(e.to_string()),
        })?;
        match self
            .run_single_update(SavePayoutDetailsArg(id, serial).into(), format!("partner:{id}"))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.code, AppErrorCode::ObjectNotExist) => {
                if self.fetch(id).await?.is_some() {
                    Ok(())
                } else {
                    Err(e)
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn record_login(
        &self,
        id: &str,
        at: DateTime<FixedOffset>,
    ) -> DefaultResult<(), AppError> {
        self.run_single_update(RecordLoginArg(id, at).into(), format!("partner:{id}"))
            .await
    }
} // end of impl AbsPartnerRepo for PartnerMariaDbRepo
