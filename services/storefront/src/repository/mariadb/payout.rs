use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Acquire, Arguments, Row};

use ecommerce_common::error::AppErrorCode;

use super::super::AbsPayoutRepo;
use super::{col_datetime, col_opt_datetime, fetch_all_rows, fetch_one_row, run_query_once};
use crate::api::web::dto::PayoutDetailsDto;
use crate::datastore::AppMariaDbStore;
use crate::error::AppError;
use crate::model::{PayoutDetailsModel, PayoutMethod, PayoutRequestModel, PayoutState};

struct InsertArg<'a>(&'a PayoutRequestModel);
// the current state rides along in the WHERE clause, a review raced by
// another admin affects zero rows and is retried from fresh state
struct ReviewArg<'a> {
    id: &'a str,
    from: PayoutState,
    to: PayoutState,
    admin_notes: Option<String>,
    paid_at: Option<DateTime<FixedOffset>>,
}

const SELECT_COLUMNS: &str = "`id`,`partner_id`,`amount`,`status`,`payout_method`,\
     `payout_details`,`admin_notes`,`paid_at`,`created_at`";

impl<'a> TryFrom<InsertArg<'a>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: InsertArg<'a>) -> DefaultResult<(String, MySqlArguments), AppError> {
        let sql_patt = "INSERT INTO `payout_request`(`id`,`partner_id`,`amount`,`status`,\
             `payout_method`,`payout_details`,`admin_notes`,`paid_at`,`created_at`) \
             VALUES (?,?,?,?,?,?,?,?,?)";
        let m = value.0;
        let details = {
            let dto = PayoutDetailsDto::from(m.details_snapshot.clone());
            serde_json::to_string(&dto).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?
        };
        let mut args = MySqlArguments::default();
        args.add(m.id.as_str());
        args.add(m.partner_id.as_str());
        args.add(m.amount);
        args.add(m.state.as_str());
        args.add(m.method.as_str());
        args.add(details);
        args.add(m.admin_notes.clone());
        args.add(m.paid_at.map(|t| t.to_rfc3339()));
        args.add(m.created_at.to_rfc3339());
        Ok((sql_patt.to_string(), args))
    }
}

impl<'a> From<ReviewArg<'a>> for (String, MySqlArguments) {
    fn from(value: ReviewArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "UPDATE `payout_request` SET `status`=?,`admin_notes`=COALESCE(?,`admin_notes`),\
             `paid_at`=COALESCE(?,`paid_at`) WHERE `id`=? AND `status`=?";
        let mut args = MySqlArguments::default();
        args.add(value.to.as_str());
        args.add(value.admin_notes);
        args.add(value.paid_at.map(|t| t.to_rfc3339()));
        args.add(value.id);
        args.add(value.from.as_str());
        (sql_patt.to_string(), args)
    }
}

fn to_model(row: &MySqlRow) -> DefaultResult<PayoutRequestModel, AppError> {
    let details = {
        let raw = row.try_get::<String, usize>(5)?;
        let dto = serde_json::from_str::<PayoutDetailsDto>(raw.as_str()).map_err(|e| {
            AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(e.to_string()),
            }
        })?;
        PayoutDetailsModel::from(dto)
    };
    Ok(PayoutRequestModel {
        id: row.try_get(0)?,
        partner_id: row.try_get(1)?,
        amount: row.try_get(2)?,
        state: PayoutState::from_str(row.try_get::<String, usize>(3)?.as_str())?,
        method: PayoutMethod::from_str(row.try_get::<String, usize>(4)?.as_str())?,
        details_snapshot: details,
        admin_notes: row.try_get(6)?,
        paid_at: col_opt_datetime(row, 7)?,
        created_at: col_datetime(row, 8)?,
    })
}

pub(crate) struct PayoutMariaDbRepo {
    db: Arc<AppMariaDbStore>,
}

impl PayoutMariaDbRepo {
    pub(crate) fn new(dbs: Vec<Arc<AppMariaDbStore>>) -> DefaultResult<Self, AppError> {
        let db = dbs.first().cloned().ok_or(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { db })
    }
}

#[async_trait]
impl AbsPayoutRepo for PayoutMariaDbRepo {
    async fn create(&self, item: PayoutRequestModel) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = InsertArg(&item).try_into()?;
        let _rs = run_query_once(&mut tx, sql_patt, args, Some(1)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> DefaultResult<Option<PayoutRequestModel>, AppError> {
        let sql_patt = format!("SELECT {SELECT_COLUMNS} FROM `payout_request` WHERE `id`=?");
        let mut args = MySqlArguments::default();
        args.add(id);
        let mut conn = self.db.acquire().await?;
        let maybe_row = fetch_one_row(&mut conn, sql_patt, args).await?;
        match maybe_row {
            Some(row) => Ok(Some(to_model(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<PayoutRequestModel>, AppError> {
        let mut conn = self.db.acquire().await?;
        let sql_patt = format!(
            "SELECT {SELECT_COLUMNS} FROM `payout_request` ORDER BY `created_at` DESC"
        );
        let rows = fetch_all_rows(&mut conn, sql_patt, MySqlArguments::default()).await?;
        rows.iter().map(to_model).collect()
    }

    async fn fetch_by_partner(
        &self,
        partner_id: &str,
    ) -> DefaultResult<Vec<PayoutRequestModel>, AppError> {
        let sql_patt = format!(
            "SELECT {SELECT_COLUMNS} FROM `payout_request` WHERE `partner_id`=? \
             ORDER BY `created_at` DESC"
        );
        let mut args = MySqlArguments::default();
        args.add(partner_id);
        let mut conn = self.db.acquire().await?;
        let rows = fetch_all_rows(&mut conn, sql_patt, args).await?;
        rows.iter().map(to_model).collect()
    }

    async fn update_review(
        &self,
        id: &str,
        next: PayoutState,
        admin_notes: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PayoutRequestModel, AppError> {
        let mut stored = self.fetch(id).await?.ok_or(AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("payout-request:{id}")),
        })?;
        let from = stored.state;
        stored.apply_review(next, admin_notes.clone(), now)?;
        let arg = ReviewArg {
            id,
            from,
            to: next,
            admin_notes,
            paid_at: if matches!(next, PayoutState::Paid) {
                Some(now)
            } else {
                None
            },
        };
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = arg.into();
        let rs = run_query_once(&mut tx, sql_patt, args, None).await?;
        tx.commit().await?;
        if rs.rows_affected() == 0 {
            // another reviewer moved the request first
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("payout-review-conflict:{id}")),
            })
        } else {
            Ok(stored)
        }
    } // end of fn update_review

    async fn sum_reserved_amount(&self, partner_id: &str) -> DefaultResult<Decimal, AppError> {
        let sql_patt = "SELECT COALESCE(SUM(`amount`),0) FROM `payout_request` \
             WHERE `partner_id`=? AND `status` IN ('Pending','Approved','Paid')";
        let mut args = MySqlArguments::default();
        args.add(partner_id);
        let mut conn = self.db.acquire().await?;
        let maybe_row = fetch_one_row(&mut conn, sql_patt.to_string(), args).await?;
        match maybe_row {
            Some(row) => Ok(row.try_get::<Decimal, usize>(0)?),
            None => Ok(Decimal::ZERO),
        }
    }
} // end of impl AbsPayoutRepo for PayoutMariaDbRepo
