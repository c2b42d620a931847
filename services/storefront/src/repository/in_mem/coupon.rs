use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;

use ecommerce_common::error::AppErrorCode;

use super::super::AbsCouponRepo;
use super::{
    fmt_bool, fmt_opt, opt_cell, parse_bool, parse_datetime, parse_decimal, parse_int, row_column,
    MatchAllKeysOp,
};
use crate::datastore::{AbstInMemoryDStore, AppInMemUpdateData};
use crate::error::AppError;
use crate::model::{CouponDiscountModel, CouponModel};

const TABLE_LABEL: &str = "coupon";
const CODE_INDEX_LABEL: &str = "coupon_code_index";

enum InMemColIdx {
    Code,
    DiscountType,
    DiscountValue,
    MinOrderValue,
    ExpirationDate,
    UsageLimit,
    UsedCount,
    IsActive,
    SentTo,
    CreatedAt,
    TotNumColumns,
}

impl From<InMemColIdx> for usize {
    fn from(value: InMemColIdx) -> usize {
        match value {
            InMemColIdx::Code => 0,
            InMemColIdx::DiscountType => 1,
            InMemColIdx::DiscountValue => 2,
            InMemColIdx::MinOrderValue => 3,
            InMemColIdx::ExpirationDate => 4,
            InMemColIdx::UsageLimit => 5,
            InMemColIdx::UsedCount => 6,
            InMemColIdx::IsActive => 7,
            InMemColIdx::SentTo => 8,
            InMemColIdx::CreatedAt => 9,
            InMemColIdx::TotNumColumns => 10,
        }
    }
}

fn to_row(m: &CouponModel) -> Vec<String> {
    let mut row = (0..InMemColIdx::TotNumColumns.into())
        .map(|_n| String::new())
        .collect::<Vec<String>>();
    let _ = [
        (InMemColIdx::Code, m.code.clone()),
        (InMemColIdx::DiscountType, m.discount.type_label().to_string()),
        (InMemColIdx::DiscountValue, m.discount.value().to_string()),
        (InMemColIdx::MinOrderValue, m.min_order_value.to_string()),
        (
            InMemColIdx::ExpirationDate,
            m.expiration_date.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
        (InMemColIdx::UsageLimit, fmt_opt(&m.usage_limit)),
        (InMemColIdx::UsedCount, m.used_count.to_string()),
        (InMemColIdx::IsActive, fmt_bool(m.is_active)),
        (InMemColIdx::SentTo, fmt_opt(&m.sent_to)),
        (InMemColIdx::CreatedAt, m.created_at.to_rfc3339()),
    ]
    .into_iter()
    .map(|(idx, val)| {
        let idx: usize = idx.into();
        row[idx] = val;
    })
    .collect::<Vec<()>>();
    row
}

fn to_model(id: &str, row: &[String]) -> DefaultResult<CouponModel, AppError> {
    let discount = CouponDiscountModel::try_from_parts(
        row_column(row, InMemColIdx::DiscountType.into())?.as_str(),
        parse_decimal(row_column(row, InMemColIdx::DiscountValue.into())?)?,
    )?;
    let expiration_date = match opt_cell(row_column(row, InMemColIdx::ExpirationDate.into())?) {
        Some(s) => Some(parse_datetime(s.as_str())?),
        None => None,
    };
    let usage_limit = match opt_cell(row_column(row, InMemColIdx::UsageLimit.into())?) {
        Some(s) => Some(parse_int::<u32>(s.as_str())?),
        None => None,
    };
    Ok(CouponModel {
        id: id.to_string(),
        code: row_column(row, InMemColIdx::Code.into())?.clone(),
        discount,
        min_order_value: parse_decimal(row_column(row, InMemColIdx::MinOrderValue.into())?)?,
        expiration_date,
        usage_limit,
        used_count: parse_int(row_column(row, InMemColIdx::UsedCount.into())?)?,
        is_active: parse_bool(row_column(row, InMemColIdx::IsActive.into())?)?,
        sent_to: opt_cell(row_column(row, InMemColIdx::SentTo.into())?),
        created_at: parse_datetime(row_column(row, InMemColIdx::CreatedAt.into())?)?,
    })
} // end of fn to_model

pub struct CouponInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl CouponInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(TABLE_LABEL).await?;
        m.create_table(CODE_INDEX_LABEL).await?;
        Ok(Self { datastore: m })
    }

    async fn resolve_id(&self, code: &str) -> DefaultResult<Option<String>, AppError> {
        let code = CouponModel::normalize_code(code);
        let keys = HashMap::from([(CODE_INDEX_LABEL.to_string(), vec![code.clone()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched
            .get(CODE_INDEX_LABEL)
            .and_then(|t| t.get(code.as_str()))
            .and_then(|row| row.first().cloned());
        Ok(found)
    }
}

#[async_trait]
impl AbsCouponRepo for CouponInMemRepo {
    async fn create(&self, item: CouponModel) -> DefaultResult<(), AppError> {
        let keys = HashMap::from([(CODE_INDEX_LABEL.to_string(), vec![item.code.clone()])]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let taken = fetched
            .get(CODE_INDEX_LABEL)
            .map(|t| t.contains_key(item.code.as_str()))
            .unwrap_or(false);
        if taken {
            return Err(AppError {
                code: AppErrorCode::DuplicateKeyExists,
                detail: Some(format!("coupon-code:{}", item.code)),
            });
        }
        let mut data: AppInMemUpdateData = HashMap::new();
        data.insert(
            TABLE_LABEL.to_string(),
            HashMap::from([(item.id.clone(), to_row(&item))]),
        );
        data.insert(
            CODE_INDEX_LABEL.to_string(),
            HashMap::from([(item.code.clone(), vec![item.id.clone()])]),
        );
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    } // end of fn create

    async fn fetch(&self, id: &str) -> DefaultResult<Option<CouponModel>, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![id.to_string()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched.get(TABLE_LABEL).and_then(|t| t.get(id));
        match found {
            Some(row) => Ok(Some(to_model(id, row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_by_code(&self, code: &str) -> DefaultResult<Option<CouponModel>, AppError> {
        match self.resolve_id(code).await? {
            Some(id) => self.fetch(id.as_str()).await,
            None => Ok(None),
        }
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<CouponModel>, AppError> {
        let op = MatchAllKeysOp;
        let ids = self.datastore.filter_keys(TABLE_LABEL.to_string(), &op).await?;
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

    async fn update(&self, item: CouponModel) -> DefaultResult<(), AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![item.id.clone()])]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let stored = fetched
            .get(TABLE_LABEL)
            .and_then(|t| t.get(item.id.as_str()))
            .ok_or(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("coupon:{}", item.id)),
            })?;
        // the used count only moves through `redeem`, a concurrent checkout
        // must not be overwritten by an admin edit
        let mut row = to_row(&item);
        let cnt_idx: usize = InMemColIdx::UsedCount.into();
        row[cnt_idx] = stored[cnt_idx].clone();
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(item.id.clone(), row)]),
        )]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    } // end of fn update

    async fn delete(&self, id: &str) -> DefaultResult<(), AppError> {
        let found = self.fetch(id).await?.ok_or(AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("coupon:{id}")),
        })?;
        let info = HashMap::from([
            (TABLE_LABEL.to_string(), vec![id.to_string()]),
            (CODE_INDEX_LABEL.to_string(), vec![found.code]),
        ]);
        let _num = self.datastore.delete(info).await?;
        Ok(())
    }

    async fn redeem(&self, code: &str) -> DefaultResult<(), AppError> {
        let id = self.resolve_id(code).await?.ok_or(AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("coupon-code:{code}")),
        })?;
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![id.clone()])]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let stored = fetched
            .get(TABLE_LABEL)
            .and_then(|t| t.get(id.as_str()))
            .ok_or(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("coupon:{id}")),
            })?;
        let mut item = to_model(id.as_str(), stored)?;
        if !item.is_active {
            return Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("coupon-inactive:{code}")),
            });
        }
        // the limit is re-checked here, under lock, concurrent checkouts
        // serialize on this row
        if let Some(lmt) = item.usage_limit {
            if item.used_count >= lmt {
                return Err(AppError {
                    code: AppErrorCode::ExceedingMaxLimit,
                    detail: Some(format!("coupon-usage-limit:{code}")),
                });
            }
        }
        item.used_count += 1;
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(id.clone(), to_row(&item))]),
        )]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    } // end of fn redeem
} // end of impl AbsCouponRepo for CouponInMemRepo
