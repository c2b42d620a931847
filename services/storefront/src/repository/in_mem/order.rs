use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use ecommerce_common::error::AppErrorCode;

use super::super::{AbsOrderRepo, CommissionAccrualModel};
use super::partner::{InMemColIdx as PartnerColIdx, TABLE_LABEL as PARTNER_TABLE_LABEL};
use super::{
    fmt_opt, opt_cell, parse_datetime, parse_decimal, parse_int, row_column, ColumnEqualOp,
    MatchAllKeysOp,
};
use crate::api::web::dto::{CustomerContactDto, OrderItemDto};
use crate::datastore::{AbstInMemoryDStore, AppInMemUpdateData};
use crate::error::AppError;
use crate::model::{
    ContactSnapshotModel, OrderLineModel, OrderModel, OrderStatus, PaymentMethod,
};

const TABLE_LABEL: &str = "order_toplvl";

enum InMemColIdx {
    Customer,
    Lines,
    Amount,
    ShippingFee,
    Discount,
    CouponCode,
    PartnerCode,
    PartnerCommission,
    PaymentMethod,
    TransactionId,
    Status,
    TrackingNumber,
    CourierName,
    CreatedAt,
    TotNumColumns,
}

impl From<InMemColIdx> for usize {
    fn from(value: InMemColIdx) -> usize {
        match value {
            InMemColIdx::Customer => 0,
            InMemColIdx::Lines => 1,
            InMemColIdx::Amount => 2,
            InMemColIdx::ShippingFee => 3,
            InMemColIdx::Discount => 4,
            InMemColIdx::CouponCode => 5,
            InMemColIdx::PartnerCode => 6,
            InMemColIdx::PartnerCommission => 7,
            InMemColIdx::PaymentMethod => 8,
            InMemColIdx::TransactionId => 9,
            InMemColIdx::Status => 10,
            InMemColIdx::TrackingNumber => 11,
            InMemColIdx::CourierName => 12,
            InMemColIdx::CreatedAt => 13,
            InMemColIdx::TotNumColumns => 14,
        }
    }
}

fn jsn_encode<T: serde::Serialize>(v: &T) -> DefaultResult<String, AppError> {
    serde_json::to_string(v).map_err(|e| AppError {
        code: AppErrorCode::InvalidInput,
        detail: Some(e.to_string()),
    })
}
fn jsn_decode<T: serde::de::DeserializeOwned>(raw: &str) -> DefaultResult<T, AppError> {
    serde_json::from_str::<T>(raw).map_err(|e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(e.to_string()),
    })
}

fn to_row(m: &OrderModel) -> DefaultResult<Vec<String>, AppError> {
    let customer = jsn_encode(&CustomerContactDto::from(m.customer.clone()))?;
    let lines = {
        let dtos = m
            .lines
            .iter()
            .cloned()
            .map(OrderItemDto::from)
            .collect::<Vec<_>>();
        jsn_encode(&dtos)?
    };
    let mut row = (0..InMemColIdx::TotNumColumns.into())
        .map(|_n| String::new())
        .collect::<Vec<String>>();
    let _ = [
        (InMemColIdx::Customer, customer),
        (InMemColIdx::Lines, lines),
        (InMemColIdx::Amount, m.amount.to_string()),
        (InMemColIdx::ShippingFee, m.shipping_fee.to_string()),
        (InMemColIdx::Discount, m.discount.to_string()),
        (InMemColIdx::CouponCode, fmt_opt(&m.coupon_code)),
        (InMemColIdx::PartnerCode, fmt_opt(&m.partner_code)),
        (InMemColIdx::PartnerCommission, fmt_opt(&m.partner_commission)),
        (
            InMemColIdx::PaymentMethod,
            m.payment_method.as_str().to_string(),
        ),
        (InMemColIdx::TransactionId, fmt_opt(&m.transaction_id)),
        (InMemColIdx::Status, m.status.as_str().to_string()),
        (InMemColIdx::TrackingNumber, fmt_opt(&m.tracking_number)),
        (InMemColIdx::CourierName, fmt_opt(&m.courier_name)),
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

fn to_model(order_id: &str, row: &[String]) -> DefaultResult<OrderModel, AppError> {
    let customer: CustomerContactDto = jsn_decode(row_column(row, InMemColIdx::Customer.into())?)?;
    let lines: Vec<OrderItemDto> = jsn_decode(row_column(row, InMemColIdx::Lines.into())?)?;
    let partner_commission = match opt_cell(row_column(row, InMemColIdx::PartnerCommission.into())?)
    {
        Some(s) => Some(parse_decimal(s.as_str())?),
        None => None,
    };
    Ok(OrderModel {
        order_id: order_id.to_string(),
        customer: ContactSnapshotModel::from(customer),
        lines: lines.into_iter().map(OrderLineModel::from).collect(),
        amount: parse_decimal(row_column(row, InMemColIdx::Amount.into())?)?,
        shipping_fee: parse_decimal(row_column(row, InMemColIdx::ShippingFee.into())?)?,
        discount: parse_decimal(row_column(row, InMemColIdx::Discount.into())?)?,
        coupon_code: opt_cell(row_column(row, InMemColIdx::CouponCode.into())?),
        partner_code: opt_cell(row_column(row, InMemColIdx::PartnerCode.into())?),
        partner_commission,
        payment_method: PaymentMethod::from_str(
            row_column(row, InMemColIdx::PaymentMethod.into())?,
        )?,
        transaction_id: opt_cell(row_column(row, InMemColIdx::TransactionId.into())?),
        status: OrderStatus::from_str(row_column(row, InMemColIdx::Status.into())?)?,
        tracking_number: opt_cell(row_column(row, InMemColIdx::TrackingNumber.into())?),
        courier_name: opt_cell(row_column(row, InMemColIdx::CourierName.into())?),
        created_at: parse_datetime(row_column(row, InMemColIdx::CreatedAt.into())?)?,
    })
} // end of fn to_model

pub struct OrderInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl OrderInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(TABLE_LABEL).await?;
        m.create_table(PARTNER_TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }
}

#[async_trait]
impl AbsOrderRepo for OrderInMemRepo {
    async fn create(
        &self,
        order: OrderModel,
        accrual: Option<CommissionAccrualModel>,
    ) -> DefaultResult<(), AppError> {
        let oid = order.order_id.clone();
        let mut keys = HashMap::from([(TABLE_LABEL.to_string(), vec![oid.clone()])]);
        if let Some(a) = accrual.as_ref() {
            keys.insert(PARTNER_TABLE_LABEL.to_string(), vec![a.partner_id.clone()]);
        }
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let oid_taken = fetched
            .get(TABLE_LABEL)
            .map(|t| t.contains_key(oid.as_str()))
            .unwrap_or(false);
        if oid_taken {
            // the random generator produced an id already in use, caller
            // may retry with a fresh one
            return Err(AppError {
                code: AppErrorCode::DuplicateKeyExists,
                detail: Some(format!("order-id:{oid}")),
            });
        }
        let mut data: AppInMemUpdateData = HashMap::new();
        // order write and partner aggregate update land in the same locked
        // save, a failure before this point leaves neither applied
        if let Some(a) = accrual.as_ref() {
            let mut prow = fetched
                .get(PARTNER_TABLE_LABEL)
                .and_then(|t| t.get(a.partner_id.as_str()))
                .cloned()
                .ok_or(AppError {
                    code: AppErrorCode::ObjectNotExist,
                    detail: Some(format!("partner:{}", a.partner_id)),
                })?;
            let n_idx = usize::from(PartnerColIdx::TotalOrders);
            let s_idx = usize::from(PartnerColIdx::TotalSales);
            let c_idx = usize::from(PartnerColIdx::TotalCommission);
            let norder: u64 = parse_int(prow[n_idx].as_str())?;
            let sales = parse_decimal(prow[s_idx].as_str())?;
            let commission = parse_decimal(prow[c_idx].as_str())?;
            prow[n_idx] = (norder + 1).to_string();
            prow[s_idx] = (sales + a.order_amount).to_string();
            prow[c_idx] = (commission + a.commission).to_string();
            data.insert(
                PARTNER_TABLE_LABEL.to_string(),
                HashMap::from([(a.partner_id.clone(), prow)]),
            );
        }
        data.insert(
            TABLE_LABEL.to_string(),
            HashMap::from([(oid, to_row(&order)?)]),
        );
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    } // end of fn create

    async fn fetch_all(&self) -> DefaultResult<Vec<OrderModel>, AppError> {
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

    async fn fetch_by_id(&self, order_id: &str) -> DefaultResult<Option<OrderModel>, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![order_id.to_string()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched.get(TABLE_LABEL).and_then(|t| t.get(order_id));
        match found {
            Some(row) => Ok(Some(to_model(order_id, row)?)),
            None => Ok(None),
        }
    }

    async fn update_fulfillment(
        &self,
        order_id: &str,
        status: Option<OrderStatus>,
        tracking_number: Option<String>,
        courier_name: Option<String>,
    ) -> DefaultResult<OrderModel, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![order_id.to_string()])]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let mut row = fetched
            .get(TABLE_LABEL)
            .and_then(|t| t.get(order_id))
            .cloned()
            .ok_or(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("order:{order_id}")),
            })?;
        if let Some(s) = status {
            row[usize::from(InMemColIdx::Status)] = s.as_str().to_string();
        }
        if let Some(t) = tracking_number {
            row[usize::from(InMemColIdx::TrackingNumber)] = t;
        }
        if let Some(c) = courier_name {
            row[usize::from(InMemColIdx::CourierName)] = c;
        }
        let updated = to_model(order_id, &row)?;
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(order_id.to_string(), row)]),
        )]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(updated)
    } // end of fn update_fulfillment

    async fn fetch_by_partner_code(
        &self,
        code: &str,
        since: Option<DateTime<FixedOffset>>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let op = ColumnEqualOp {
            col_idx: InMemColIdx::PartnerCode.into(),
            expect: code.to_string(),
        };
        let ids = self.datastore.filter_keys(TABLE_LABEL.to_string(), &op).await?;
        let keys = HashMap::from([(TABLE_LABEL.to_string(), ids)]);
        let fetched = self.datastore.fetch(keys).await?;
        let mut out = Vec::new();
        if let Some(t) = fetched.get(TABLE_LABEL) {
            for (id, row) in t.iter() {
                let m = to_model(id, row)?;
                if since.map(|s| m.created_at >= s).unwrap_or(true) {
                    out.push(m);
                }
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
} // end of impl AbsOrderRepo for OrderInMemRepo
