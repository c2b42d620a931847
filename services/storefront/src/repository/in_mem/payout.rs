use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use super::super::AbsPayoutRepo;
use super::{
    fmt_opt, opt_cell, parse_datetime, parse_decimal, row_column, ColumnEqualOp, MatchAllKeysOp,
};
use crate::api::web::dto::PayoutDetailsDto;
use crate::datastore::AbstInMemoryDStore;
use crate::error::AppError;
use crate::model::{PayoutDetailsModel, PayoutMethod, PayoutRequestModel, PayoutState};

const TABLE_LABEL: &str = "payout_request";

enum InMemColIdx {
    PartnerId,
    Amount,
    Status,
    Method,
    DetailsSnapshot,
    AdminNotes,
    PaidAt,
    CreatedAt,
    TotNumColumns,
}

impl From<InMemColIdx> for usize {
    fn from(value: InMemColIdx) -> usize {
        match value {
            InMemColIdx::PartnerId => 0,
            InMemColIdx::Amount => 1,
            InMemColIdx::Status => 2,
            InMemColIdx::Method => 3,
            InMemColIdx::DetailsSnapshot => 4,
            InMemColIdx::AdminNotes => 5,
            InMemColIdx::PaidAt => 6,
            InMemColIdx::CreatedAt => 7,
            InMemColIdx::TotNumColumns => 8,
        }
    }
}

fn to_row(m: &PayoutRequestModel) -> DefaultResult<Vec<String>, AppError> {
    let details = {
        let dto = PayoutDetailsDto::from(m.details_snapshot.clone());
        serde_json::to_string(&dto).map_err(|e| AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(e.to_string()),
        })?
    };
    let mut row = (0..InMemColIdx::TotNumColumns.into())
        .map(|_n| String::new())
        .collect::<Vec<String>>();
    let _ = [
        (InMemColIdx::PartnerId, m.partner_id.clone()),
        (InMemColIdx::Amount, m.amount.to_string()),
        (InMemColIdx::Status, m.state.as_str().to_string()),
        (InMemColIdx::Method, m.method.as_str().to_string()),
        (InMemColIdx::DetailsSnapshot, details),
        (InMemColIdx::AdminNotes, fmt_opt(&m.admin_notes)),
        (
            InMemColIdx::PaidAt,
            m.paid_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
        (InMemColIdx::CreatedAt, m.created_at.to_rfc3339()),
    ]
    .into_iter()
    .map(|(idx, val)| {
        let idx: usize = idx.into();
        row[idx] = val;
    })
    .collect::<Vec<()>>();
    Ok(row)
}

fn to_model(id: &str, row: &[String]) -> DefaultResult<PayoutRequestModel, AppError> {
    let details: PayoutDetailsDto =
        serde_json::from_str(row_column(row, InMemColIdx::DetailsSnapshot.into())?).map_err(
            |e| AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(e.to_string()),
            },
        )?;
    let paid_at = match opt_cell(row_column(row, InMemColIdx::PaidAt.into())?) {
        Some(s) => Some(parse_datetime(s.as_str())?),
        None => None,
    };
    Ok(PayoutRequestModel {
        id: id.to_string(),
        partner_id: row_column(row, InMemColIdx::PartnerId.into())?.clone(),
        amount: parse_decimal(row_column(row, InMemColIdx::Amount.into())?)?,
        state: PayoutState::from_str(row_column(row, InMemColIdx::Status.into())?)?,
        method: PayoutMethod::from_str(row_column(row, InMemColIdx::Method.into())?)?,
        details_snapshot: PayoutDetailsModel::from(details),
        admin_notes: opt_cell(row_column(row, InMemColIdx::AdminNotes.into())?),
        paid_at,
        created_at: parse_datetime(row_column(row, InMemColIdx::CreatedAt.into())?)?,
    })
} // end of fn to_model

pub struct PayoutInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl PayoutInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }

    async fn collect_by_op(
        &self,
        op: &dyn crate::datastore::AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<PayoutRequestModel>, AppError> {
        let ids = self.datastore.filter_keys(TABLE_LABEL.to_string(), op).await?;
        let keys = HashMap::from([(TABLE_LABEL.to_string(), ids)]);
        let fetched = self.datastore.fetch(keys).await?;
        let mut out = Vec::new();
        if let Some(t) = fetched.get(TABLE_LABEL) {
            for (id, row) in t.iter() {
                out.push(to_model(id, row)?);
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

#[async_trait]
impl AbsPayoutRepo for PayoutInMemRepo {
    async fn create(&self, item: PayoutRequestModel) -> DefaultResult<(), AppError> {
        let row = to_row(&item)?;
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(item.id.clone(), row)]),
        )]);
        let _num = self.datastore.save(data).await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> DefaultResult<Option<PayoutRequestModel>, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![id.to_string()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched.get(TABLE_LABEL).and_then(|t| t.get(id));
        match found {
            Some(row) => Ok(Some(to_model(id, row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<PayoutRequestModel>, AppError> {
        self.collect_by_op(&MatchAllKeysOp).await
    }

    async fn fetch_by_partner(
        &self,
        partner_id: &str,
    ) -> DefaultResult<Vec<PayoutRequestModel>, AppError> {
        let op = ColumnEqualOp {
            col_idx: InMemColIdx::PartnerId.into(),
            expect: partner_id.to_string(),
        };
        self.collect_by_op(&op).await
    }

    async fn update_review(
        &self,
        id: &str,
        next: PayoutState,
        admin_notes: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PayoutRequestModel, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![id.to_string()])]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let row = fetched
            .get(TABLE_LABEL)
            .and_then(|t| t.get(id))
            .ok_or(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("payout-request:{id}")),
            })?;
        let mut item = to_model(id, row)?;
        // transition validity decided by the model under the same lock, two
        // admins reviewing at once serialize here
        item.apply_review(next, admin_notes, now)?;
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(id.to_string(), to_row(&item)?)]),
        )]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(item)
    } // end of fn update_review

    async fn sum_reserved_amount(&self, partner_id: &str) -> DefaultResult<Decimal, AppError> {
        let all = self.fetch_by_partner(partner_id).await?;
        let total = all
            .iter()
            .filter(|r| r.state.holds_balance())
            .map(|r| r.amount)
            .sum();
        Ok(total)
    }
} // end of impl AbsPayoutRepo for PayoutInMemRepo
