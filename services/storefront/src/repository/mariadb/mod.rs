pub(super) mod content;
pub(super) mod coupon;
pub(super) mod order;
pub(super) mod partner;
pub(super) mod payout;
pub(super) mod product;

use std::io::ErrorKind;
use std::ops::DerefMut;
use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use sqlx::error::Error;
use sqlx::mysql::{MySqlArguments, MySqlQueryResult, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::{Executor, MySql, Row, Statement, Transaction};

use ecommerce_common::error::AppErrorCode;

use crate::error::AppError;

impl From<Error> for AppError {
    fn from(value: Error) -> Self {
        let (code, detail) = match value {
            Error::Configuration(e) => (
                AppErrorCode::InvalidInput,
                e.to_string() + " invalid-db-config",
            ),
            Error::Io(e) => (
                AppErrorCode::IOerror(e.kind()),
                e.to_string() + " io-err-mariadb",
            ),
            Error::Database(e) => {
                // duplicate-entry violations surface as user-facing
                // "already exists" messages upstream
                if e.is_unique_violation() {
                    (AppErrorCode::DuplicateKeyExists, e.to_string())
                } else {
                    (AppErrorCode::RemoteDbServerFailure, e.to_string())
                }
            }
            Error::Protocol(errmsg) => (AppErrorCode::IOerror(ErrorKind::InvalidData), errmsg),
            Error::Decode(e) => (AppErrorCode::DataCorruption, e.to_string()),
            Error::ColumnDecode { index, source } => (
                AppErrorCode::DataCorruption,
                source.to_string() + ", when decoding column at idx " + index.as_str(),
            ),
            Error::Tls(e) => (
                AppErrorCode::IOerror(ErrorKind::NotConnected),
                e.to_string(),
            ),
            Error::TypeNotFound { type_name } => {
                (AppErrorCode::InvalidInput, type_name + " wrong-col-typ")
            }
            Error::ColumnNotFound(col_name) => (
                AppErrorCode::IOerror(ErrorKind::NotFound),
                col_name + " no-col",
            ),
            Error::RowNotFound => (
                AppErrorCode::IOerror(ErrorKind::NotFound),
                "no-row".to_string(),
            ),
            Error::ColumnIndexOutOfBounds { index, len } => (
                AppErrorCode::InvalidInput,
                format!("req-idx:{}, limit:{}", index, len),
            ),
            Error::PoolTimedOut => (
                AppErrorCode::DatabaseServerBusy,
                "no-conn-avail".to_string(),
            ),
            Error::PoolClosed => (AppErrorCode::Unknown, "pool-closed".to_string()),
            Error::WorkerCrashed => (
                AppErrorCode::Unknown,
                "low-level-db-worker-crashed".to_string(),
            ),
            _others => (
                AppErrorCode::Unknown,
                "internal-implementation-issue".to_string(),
            ),
        };
        Self {
            code,
            detail: Some(detail),
        }
    } // end of fn from
} // end of impl AppError

pub(super) async fn run_query_once(
    tx: &mut Transaction<'_, MySql>,
    sql_patt: String,
    args: MySqlArguments,
    maybe_num_batch: Option<usize>,
) -> DefaultResult<MySqlQueryResult, AppError> {
    let stmt = tx.prepare(sql_patt.as_str()).await?;
    let query = stmt.query_with(args);
    let exec = tx.deref_mut();
    let resultset = query.execute(exec).await?;
    if let Some(num_batch) = maybe_num_batch {
        let num_affected = resultset.rows_affected() as usize;
        if num_affected == num_batch {
            Ok(resultset)
        } else {
            let detail = format!(
                "num_affected, actual:{}, expect:{}",
                num_affected, num_batch
            );
            Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(detail),
            })
        }
    } else {
        Ok(resultset)
    }
}

pub(super) async fn fetch_all_rows(
    conn: &mut PoolConnection<MySql>,
    sql_patt: String,
    args: MySqlArguments,
) -> DefaultResult<Vec<MySqlRow>, AppError> {
    let stmt = conn.prepare(sql_patt.as_str()).await?;
    let query = stmt.query_with(args);
    let exec = conn.deref_mut();
    let rows = query.fetch_all(exec).await?;
    Ok(rows)
}

pub(super) async fn fetch_one_row(
    conn: &mut PoolConnection<MySql>,
    sql_patt: String,
    args: MySqlArguments,
) -> DefaultResult<Option<MySqlRow>, AppError> {
    let stmt = conn.prepare(sql_patt.as_str()).await?;
    let query = stmt.query_with(args);
    let exec = conn.deref_mut();
    let row = query.fetch_optional(exec).await?;
    Ok(row)
}

// timestamps persist as RFC-3339 text, written solely by this service so
// the textual ordering matches the chronological one
pub(super) fn col_datetime(
    row: &MySqlRow,
    idx: usize,
) -> DefaultResult<DateTime<FixedOffset>, AppError> {
    let raw = row.try_get::<String, usize>(idx)?;
    DateTime::parse_from_rfc3339(raw.as_str()).map_err(|e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("datetime-column:{raw}, {e}")),
    })
}

pub(super) fn col_opt_datetime(
    row: &MySqlRow,
    idx: usize,
) -> DefaultResult<Option<DateTime<FixedOffset>>, AppError> {
    let raw = row.try_get::<Option<String>, usize>(idx)?;
    match raw {
        Some(s) => {
            let t = DateTime::parse_from_rfc3339(s.as_str()).map_err(|e| AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("datetime-column:{s}, {e}")),
            })?;
            Ok(Some(t))
        }
        None => Ok(None),
    }
}
