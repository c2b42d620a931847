use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use ecommerce_common::error::AppErrorCode;

use super::super::AbsPartnerRepo;
use super::{
    fmt_bool, fmt_opt, opt_cell, parse_bool, parse_datetime, parse_decimal, parse_int, row_column,
    MatchAllKeysOp,
};
use crate::api::web::dto::PayoutDetailsDto;
use crate::datastore::{AbstInMemoryDStore, AppInMemUpdateData};
use crate::error::AppError;
use crate::model::{CommissionPolicyModel, PartnerModel, PayoutDetailsModel};

pub(in crate::repository) const TABLE_LABEL: &str = "partner";
const CODE_INDEX_LABEL: &str = "partner_code_index";
const EMAIL_INDEX_LABEL: &str = "partner_email_index";

pub(in crate::repository) enum InMemColIdx {
    Name,
    Email,
    Phone,
    Code,
    CommissionType,
    CommissionValue,
    IsActive,
    HasAccess,
    PasswordHash,
    LoginCount,
    LastLoginAt,
    PayoutDetails,
    Logo,
    Description,
    Website,
    TotalOrders,
    TotalSales,
    TotalCommission,
    CreatedAt,
    TotNumColumns,
}

impl From<InMemColIdx> for usize {
    fn from(value: InMemColIdx) -> usize {
        match value {
            InMemColIdx::Name => 0,
            InMemColIdx::Email => 1,
            InMemColIdx::Phone => 2,
            InMemColIdx::Code => 3,
            InMemColIdx::CommissionType => 4,
            InMemColIdx::CommissionValue => 5,
            InMemColIdx::IsActive => 6,
            InMemColIdx::HasAccess => 7,
            InMemColIdx::PasswordHash => 8,
            InMemColIdx::LoginCount => 9,
            InMemColIdx::LastLoginAt => 10,
            InMemColIdx::PayoutDetails => 11,
            InMemColIdx::Logo => 12,
            InMemColIdx::Description => 13,
            InMemColIdx::Website => 14,
            InMemColIdx::TotalOrders => 15,
            InMemColIdx::TotalSales => 16,
            InMemColIdx::TotalCommission => 17,
            InMemColIdx::CreatedAt => 18,
            InMemColIdx::TotNumColumns => 19,
        }
    }
}

fn serialize_payout_details(d: &Option<PayoutDetailsModel>) -> DefaultResult<String, AppError> {
    match d {
        Some(m) => {
            let dto = PayoutDetailsDto::from(m.clone());
            serde_json::to_string(&dto).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })
        }
        None => Ok(String::new()),
    }
}

fn deserialize_payout_details(raw: &str) -> DefaultResult<Option<PayoutDetailsModel>, AppError> {
    if raw.is_empty() {
        Ok(None)
    } else {
        let dto = serde_json::from_str::<PayoutDetailsDto>(raw).map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(format!("payout-details-column, {e}")),
        })?;
        Ok(Some(dto.into()))
    }
}

fn to_row(m: &PartnerModel) -> DefaultResult<Vec<String>, AppError> {
    let mut row = (0..InMemColIdx::TotNumColumns.into())
        .map(|_n| String::new())
        .collect::<Vec<String>>();
    let _ = [
        (InMemColIdx::Name, m.name.clone()),
        (InMemColIdx::Email, m.email.clone()),
        (InMemColIdx::Phone, fmt_opt(&m.phone)),
        (InMemColIdx::Code, m.partner_code.clone()),
        (
            InMemColIdx::CommissionType,
            m.commission.type_label().to_string(),
        ),
        (InMemColIdx::CommissionValue, m.commission.value().to_string()),
        (InMemColIdx::IsActive, fmt_bool(m.is_active)),
        (InMemColIdx::HasAccess, fmt_bool(m.has_access)),
        (InMemColIdx::PasswordHash, fmt_opt(&m.password_hash)),
        (InMemColIdx::LoginCount, m.login_count.to_string()),
        (
            InMemColIdx::LastLoginAt,
            m.last_login_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
        (
            InMemColIdx::PayoutDetails,
            serialize_payout_details(&m.payout_details)?,
        ),
        (InMemColIdx::Logo, fmt_opt(&m.logo)),
        (InMemColIdx::Description, fmt_opt(&m.description)),
        (InMemColIdx::Website, fmt_opt(&m.website)),
        (InMemColIdx::TotalOrders, m.total_orders.to_string()),
        (InMemColIdx::TotalSales, m.total_sales.to_string()),
        (InMemColIdx::TotalCommission, m.total_commission.to_string()),
        (InMemColIdx::CreatedAt, m.created_at.to_rfc3339()),
    ]
    .into_iter()
    .map(|(idx, val)| {
        let idx: usize = idx.into();
        row[idx] = val;
    })
    .collect::<Vec<()>>();
    Ok(row)
} // end of fn to_row

pub(in crate::repository) fn to_model(
    id: &str,
    row: &[String],
) -> DefaultResult<PartnerModel, AppError> {
    let commission = CommissionPolicyModel::try_from_parts(
        row_column(row, InMemColIdx::CommissionType.into())?.as_str(),
        parse_decimal(row_column(row, InMemColIdx::CommissionValue.into())?)?,
    )?;
    let last_login_at = match opt_cell(row_column(row, InMemColIdx::LastLoginAt.into())?) {
        Some(s) => Some(parse_datetime(s.as_str())?),
        None => None,
    };
    Ok(PartnerModel {
        id: id.to_string(),
        name: row_column(row, InMemColIdx::Name.into())?.clone(),
        email: row_column(row, InMemColIdx::Email.into())?.clone(),
        phone: opt_cell(row_column(row, InMemColIdx::Phone.into())?),
        partner_code: row_column(row, InMemColIdx::Code.into())?.clone(),
        commission,
        is_active: parse_bool(row_column(row, InMemColIdx::IsActive.into())?)?,
        has_access: parse_bool(row_column(row, InMemColIdx::HasAccess.into())?)?,
        password_hash: opt_cell(row_column(row, InMemColIdx::PasswordHash.into())?),
        login_count: parse_int(row_column(row, InMemColIdx::LoginCount.into())?)?,
        last_login_at,
        payout_details: deserialize_payout_details(
            row_column(row, InMemColIdx::PayoutDetails.into())?,
        )?,
        logo: opt_cell(row_column(row, InMemColIdx::Logo.into())?),
        description: opt_cell(row_column(row, InMemColIdx::Description.into())?),
        website: opt_cell(row_column(row, InMemColIdx::Website.into())?),
        total_orders: parse_int(row_column(row, InMemColIdx::TotalOrders.into())?)?,
        total_sales: parse_decimal(row_column(row, InMemColIdx::TotalSales.into())?)?,
        total_commission: parse_decimal(row_column(row, InMemColIdx::TotalCommission.into())?)?,
        created_at: parse_datetime(row_column(row, InMemColIdx::CreatedAt.into())?)?,
    })
} // end of fn to_model

pub struct PartnerInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl PartnerInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(TABLE_LABEL).await?;
        m.create_table(CODE_INDEX_LABEL).await?;
        m.create_table(EMAIL_INDEX_LABEL).await?;
        Ok(Self { datastore: m })
    }

    async fn resolve_index(
        &self,
        idx_label: &str,
        key: &str,
    ) -> DefaultResult<Option<String>, AppError> {
        let keys = HashMap::from([(idx_label.to_string(), vec![key.to_string()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched
            .get(idx_label)
            .and_then(|t| t.get(key))
            .and_then(|row| row.first().cloned());
        Ok(found)
    }

    // read-modify-write of a single stored row under the store lock
    async fn mutate_row<F>(&self, id: &str, mutate_fn: F) -> DefaultResult<PartnerModel, AppError>
    where
        F: FnOnce(&mut Vec<String>) -> DefaultResult<(), AppError> + Send,
    {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![id.to_string()])]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let mut row = fetched
            .get(TABLE_LABEL)
            .and_then(|t| t.get(id))
            .cloned()
            .ok_or(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("partner:{id}")),
            })?;
        mutate_fn(&mut row)?;
        let updated = to_model(id, &row)?;
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(id.to_string(), row)]),
        )]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(updated)
    }
} // end of impl PartnerInMemRepo

#[async_trait]
impl AbsPartnerRepo for PartnerInMemRepo {
    async fn create(&self, item: PartnerModel) -> DefaultResult<(), AppError> {
        let keys = HashMap::from([
            (CODE_INDEX_LABEL.to_string(), vec![item.partner_code.clone()]),
            (EMAIL_INDEX_LABEL.to_string(), vec![item.email.clone()]),
        ]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let code_taken = fetched
            .get(CODE_INDEX_LABEL)
            .map(|t| t.contains_key(item.partner_code.as_str()))
            .unwrap_or(false);
        if code_taken {
            return Err(AppError {
                code: AppErrorCode::DuplicateKeyExists,
                detail: Some(format!("partner-code:{}", item.partner_code)),
            });
        }
        let email_taken = fetched
            .get(EMAIL_INDEX_LABEL)
            .map(|t| t.contains_key(item.email.as_str()))
            .unwrap_or(false);
        if email_taken {
            return Err(AppError {
                code: AppErrorCode::DuplicateKeyExists,
                detail: Some(format!("partner-email:{}", item.email)),
            });
        }
        let row = to_row(&item)?;
        let mut data: AppInMemUpdateData = HashMap::new();
        data.insert(
            TABLE_LABEL.to_string(),
            HashMap::from([(item.id.clone(), row)]),
        );
        data.insert(
            CODE_INDEX_LABEL.to_string(),
            HashMap::from([(item.partner_code.clone(), vec![item.id.clone()])]),
        );
        data.insert(
            EMAIL_INDEX_LABEL.to_string(),
            HashMap::from([(item.email.clone(), vec![item.id.clone()])]),
        );
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    } // end of fn create

    async fn fetch(&self, id: &str) -> DefaultResult<Option<PartnerModel>, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![id.to_string()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched.get(TABLE_LABEL).and_then(|t| t.get(id));
        match found {
            Some(row) => Ok(Some(to_model(id, row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_by_email(&self, email: &str) -> DefaultResult<Option<PartnerModel>, AppError> {
        let email = PartnerModel::normalize_email(email);
        match self.resolve_index(EMAIL_INDEX_LABEL, email.as_str()).await? {
            Some(id) => self.fetch(id.as_str()).await,
            None => Ok(None),
        }
    }

    async fn fetch_by_code(&self, code: &str) -> DefaultResult<Option<PartnerModel>, AppError> {
        let code = PartnerModel::normalize_code(code);
        match self.resolve_index(CODE_INDEX_LABEL, code.as_str()).await? {
            Some(id) => self.fetch(id.as_str()).await,
            None => Ok(None),
        }
    }

    async fn fetch_all(&self, active_only: bool) -> DefaultResult<Vec<PartnerModel>, AppError> {
        let op = MatchAllKeysOp;
        let ids = self.datastore.filter_keys(TABLE_LABEL.to_string(), &op).await?;
        let keys = HashMap::from([(TABLE_LABEL.to_string(), ids)]);
        let fetched = self.datastore.fetch(keys).await?;
        let mut out = Vec::new();
        if let Some(t) = fetched.get(TABLE_LABEL) {
            for (id, row) in t.iter() {
                let m = to_model(id, row)?;
                if !active_only || m.is_active {
                    out.push(m);
                }
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn update_profile(&self, item: PartnerModel) -> DefaultResult<(), AppError> {
        let id = item.id.clone();
        let keys = HashMap::from([
            (TABLE_LABEL.to_string(), vec![id.clone()]),
            (CODE_INDEX_LABEL.to_string(), vec![item.partner_code.clone()]),
            (EMAIL_INDEX_LABEL.to_string(), vec![item.email.clone()]),
        ]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let stored = fetched
            .get(TABLE_LABEL)
            .and_then(|t| t.get(id.as_str()))
            .cloned()
            .ok_or(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("partner:{id}")),
            })?;
        // a changed code / email must not collide with another partner
        for (idx_label, new_key) in [
            (CODE_INDEX_LABEL, item.partner_code.as_str()),
            (EMAIL_INDEX_LABEL, item.email.as_str()),
        ] {
            let owner = fetched
                .get(idx_label)
                .and_then(|t| t.get(new_key))
                .and_then(|row| row.first());
            if owner.map(|o| o.as_str() != id.as_str()).unwrap_or(false) {
                return Err(AppError {
                    code: AppErrorCode::DuplicateKeyExists,
                    detail: Some(format!("{idx_label}:{new_key}")),
                });
            }
        }
        let prev_code = stored[usize::from(InMemColIdx::Code)].clone();
        let prev_email = stored[usize::from(InMemColIdx::Email)].clone();
        // aggregates, credential and payout details stay as stored, only
        // profile fields come from the caller
        let mut row = to_row(&item)?;
        for keep in [
            InMemColIdx::PasswordHash,
            InMemColIdx::LoginCount,
            InMemColIdx::LastLoginAt,
            InMemColIdx::PayoutDetails,
            InMemColIdx::TotalOrders,
            InMemColIdx::TotalSales,
            InMemColIdx::TotalCommission,
            InMemColIdx::CreatedAt,
        ] {
            let idx: usize = keep.into();
            row[idx] = stored[idx].clone();
        }
        let mut data: AppInMemUpdateData = HashMap::new();
        data.insert(TABLE_LABEL.to_string(), HashMap::from([(id.clone(), row)]));
        data.insert(
            CODE_INDEX_LABEL.to_string(),
            HashMap::from([(item.partner_code.clone(), vec![id.clone()])]),
        );
        data.insert(
            EMAIL_INDEX_LABEL.to_string(),
            HashMap::from([(item.email.clone(), vec![id.clone()])]),
        );
        let _num = self.datastore.save_release(data, lock)?;
        // stale index entries removed after the row write, a lookup through
        // the old key in this narrow window still resolves to the same record
        let mut stale = HashMap::new();
        if prev_code != item.partner_code {
            stale.insert(CODE_INDEX_LABEL.to_string(), vec![prev_code]);
        }
        if prev_email != item.email {
            stale.insert(EMAIL_INDEX_LABEL.to_string(), vec![prev_email]);
        }
        if !stale.is_empty() {
            let _num = self.datastore.delete(stale).await?;
        }
        Ok(())
    } // end of fn update_profile

    async fn delete(&self, id: &str) -> DefaultResult<(), AppError> {
        let found = self.fetch(id).await?.ok_or(AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("partner:{id}")),
        })?;
        let info = HashMap::from([
            (TABLE_LABEL.to_string(), vec![id.to_string()]),
            (CODE_INDEX_LABEL.to_string(), vec![found.partner_code]),
            (EMAIL_INDEX_LABEL.to_string(), vec![found.email]),
        ]);
        let _num = self.datastore.delete(info).await?;
        Ok(())
    }

    async fn save_password(&self, id: &str, hash: String) -> DefaultResult<(), AppError> {
        let _updated = self
            .mutate_row(id, move |row| {
                row[usize::from(InMemColIdx::PasswordHash)] = hash;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn update_payout_details(
        &self,
        id: &str,
        details: PayoutDetailsModel,
    ) -> DefaultResult<(), AppError> {
        let serial = serialize_payout_details(&Some(details))?;
        let _updated = self
            .mutate_row(id, move |row| {
                row[usize::from(InMemColIdx::PayoutDetails)] = serial;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn record_login(
        &self,
        id: &str,
        at: DateTime<FixedOffset>,
    ) -> DefaultResult<(), AppError> {
        let _updated = self
            .mutate_row(id, move |row| {
                let cnt_idx = usize::from(InMemColIdx::LoginCount);
                let cnt: u32 = parse_int(row[cnt_idx].as_str())?;
                row[cnt_idx] = (cnt + 1).to_string();
                row[usize::from(InMemColIdx::LastLoginAt)] = at.to_rfc3339();
                Ok(())
            })
            .await?;
        Ok(())
    }
} // end of impl AbsPartnerRepo for PartnerInMemRepo
