pub(super) mod content;
pub(super) mod coupon;
pub(super) mod order;
pub(super) mod partner;
pub(super) mod payout;
pub(super) mod product;

use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use crate::datastore::AbsDStoreFilterKeyOp;
use crate::error::AppError;

// rows in the in-memory store are plain stringified columns, the helpers
// below recover typed values and flag broken rows as data corruption

pub(super) fn parse_decimal(raw: &str) -> DefaultResult<Decimal, AppError> {
    Decimal::from_str(raw).map_err(|e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("decimal-column:{raw}, {e}")),
    })
}

pub(super) fn parse_int<T: FromStr>(raw: &str) -> DefaultResult<T, AppError> {
    raw.parse::<T>().map_err(|_e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("int-column:{raw}")),
    })
}

pub(super) fn parse_datetime(raw: &str) -> DefaultResult<DateTime<FixedOffset>, AppError> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("datetime-column:{raw}, {e}")),
    })
}

pub(super) fn parse_bool(raw: &str) -> DefaultResult<bool, AppError> {
    match raw {
        "1" => Ok(true),
        "0" => Ok(false),
        _others => Err(AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(format!("bool-column:{raw}")),
        }),
    }
}

pub(super) fn fmt_bool(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

// empty cell means the column was absent
pub(super) fn opt_cell(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

pub(super) fn fmt_opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(T::to_string).unwrap_or_default()
}

pub(super) fn row_column<'a>(
    row: &'a [String],
    idx: usize,
) -> DefaultResult<&'a String, AppError> {
    row.get(idx).ok_or(AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("missing-column:{idx}")),
    })
}

pub(super) struct MatchAllKeysOp;
impl AbsDStoreFilterKeyOp for MatchAllKeysOp {
    fn filter(&self, _k: &String, _v: &Vec<String>) -> bool {
        true
    }
}

pub(super) struct ColumnEqualOp {
    pub col_idx: usize,
    pub expect: String,
}
impl AbsDStoreFilterKeyOp for ColumnEqualOp {
    fn filter(&self, _k: &String, v: &Vec<String>) -> bool {
        v.get(self.col_idx)
            .map(|cell| cell.as_str() == self.expect.as_str())
            .unwrap_or(false)
    }
}
