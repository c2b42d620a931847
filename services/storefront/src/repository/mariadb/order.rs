use std::collections::HashMap;
use std::ops::DerefMut;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures_util::TryStreamExt;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Acquire, Arguments, Executor, IntoArguments, MySql, Row, Statement};

use ecommerce_common::error::AppErrorCode;

use super::super::{AbsOrderRepo, CommissionAccrualModel};
use super::{col_datetime, fetch_all_rows, fetch_one_row, run_query_once};
use crate::api::web::dto::CustomerContactDto;
use crate::datastore::AppMariaDbStore;
use crate::error::AppError;
use crate::model::{
    ContactSnapshotModel, OrderLineModel, OrderModel, OrderStatus, PaymentMethod,
};

struct InsertTopLvlArg<'a>(&'a OrderModel);
// owns its rows, the argument buffer is handed back to the caller
struct InsertLinesArg(String, Vec<OrderLineModel>);
struct AccrualArg<'a>(&'a CommissionAccrualModel);
struct UpdateFulfillmentArg<'a> {
    order_id: &'a str,
    status: Option<OrderStatus>,
    tracking_number: Option<String>,
    courier_name: Option<String>,
}

const TOPLVL_SELECT_COLUMNS: &str = "`order_id`,`customer`,`amount`,`shipping_fee`,`discount`,\
     `coupon_code`,`partner_code`,`partner_commission`,`payment_method`,`transaction_id`,\
     `status`,`tracking_number`,`courier_name`,`created_at`";

impl<'a> TryFrom<InsertTopLvlArg<'a>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: InsertTopLvlArg<'a>) -> DefaultResult<(String, MySqlArguments), AppError> {
        let sql_patt = "INSERT INTO `order_toplvl`(`order_id`,`customer`,`amount`,\
             `shipping_fee`,`discount`,`coupon_code`,`partner_code`,`partner_commission`,\
             `payment_method`,`transaction_id`,`status`,`tracking_number`,`courier_name`,\
             `created_at`) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?)";
        let m = value.0;
        let customer = {
            let dto = CustomerContactDto::from(m.customer.clone());
            serde_json::to_string(&dto).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?
        };
        let mut args = MySqlArguments::default();
        args.add(m.order_id.as_str());
        args.add(customer);
        args.add(m.amount);
        args.add(m.shipping_fee);
        args.add(m.discount);
        args.add(m.coupon_code.clone());
        args.add(m.partner_code.clone());
        args.add(m.partner_commission);
        args.add(m.payment_method.as_str());
        args.add(m.transaction_id.clone());
        args.add(m.status.as_str());
        args.add(m.tracking_number.clone());
        args.add(m.courier_name.clone());
        args.add(m.created_at.to_rfc3339());
        Ok((sql_patt.to_string(), args))
    }
}

impl InsertLinesArg {
    fn sql_pattern(num_batch: usize) -> String {
        let col_seq = (0..num_batch)
            .map(|_| "(?,?,?,?,?,?,?)")
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "INSERT INTO `order_line`(`order_id`,`seq`,`product_id`,`name`,`unit_price`,\
             `quantity`,`image`) VALUES {col_seq}"
        )
    }
}
impl<'q> IntoArguments<'q, MySql> for InsertLinesArg {
    fn into_arguments(self) -> <MySql as sqlx::database::Database>::Arguments<'q> {
        let mut args = MySqlArguments::default();
        let (oid, lines) = (self.0, self.1);
        lines
            .into_iter()
            .enumerate()
            .map(|(seq, line)| {
                args.add(oid.clone());
                args.add(seq as u16);
                args.add(line.product_id);
                args.add(line.name);
                args.add(line.unit_price);
                args.add(line.quantity);
                args.add(line.image);
            })
            .count();
        args
    }
}
impl From<InsertLinesArg> for (String, MySqlArguments) {
    fn from(value: InsertLinesArg) -> (String, MySqlArguments) {
        (
            InsertLinesArg::sql_pattern(value.1.len()),
            value.into_arguments(),
        )
    }
}

// aggregates move in one statement, concurrent checkouts referencing the
// same partner cannot lose updates
impl<'a> From<AccrualArg<'a>> for (String, MySqlArguments) {
    fn from(value: AccrualArg<'a>) -> (String, MySqlArguments) {
        let sql_patt = "UPDATE `partner` SET `total_orders`=`total_orders`+1,\
             `total_sales`=`total_sales`+?,`total_commission`=`total_commission`+? \
             WHERE `id`=?";
        let a = value.0;
        let mut args = MySqlArguments::default();
        args.add(a.order_amount);
        args.add(a.commission);
        args.add(a.partner_id.as_str());
        (sql_patt.to_string(), args)
    }
}

impl<'a> From<UpdateFulfillmentArg<'a>> for (String, MySqlArguments) {
    fn from(value: UpdateFulfillmentArg<'a>) -> (String, MySqlArguments) {
        let mut assigns = Vec::new();
        let mut args = MySqlArguments::default();
        if let Some(s) = value.status {
            assigns.push("`status`=?");
            args.add(s.as_str());
        }
        if let Some(t) = value.tracking_number {
            assigns.push("`tracking_number`=?");
            args.add(t);
        }
        if let Some(c) = value.courier_name {
            assigns.push("`courier_name`=?");
            args.add(c);
        }
        let sql_patt = format!(
            "UPDATE `order_toplvl` SET {} WHERE `order_id`=?",
            assigns.join(",")
        );
        args.add(value.order_id);
        (sql_patt, args)
    }
}

fn to_toplvl_model(row: &MySqlRow) -> DefaultResult<OrderModel, AppError> {
    let customer = {
        let raw = row.try_get::<String, usize>(1)?;
        let dto = serde_json::from_str::<CustomerContactDto>(raw.as_str()).map_err(|e| {
            AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(e.to_string()),
            }
        })?;
        ContactSnapshotModel::from(dto)
    };
    Ok(OrderModel {
        order_id: row.try_get(0)?,
        customer,
        lines: Vec::new(), // loaded separately per order
        amount: row.try_get(2)?,
        shipping_fee: row.try_get(3)?,
        discount: row.try_get(4)?,
        coupon_code: row.try_get(5)?,
        partner_code: row.try_get(6)?,
        partner_commission: row.try_get(7)?,
        payment_method: PaymentMethod::from_str(row.try_get::<String, usize>(8)?.as_str())?,
        transaction_id: row.try_get(9)?,
        status: OrderStatus::from_str(row.try_get::<String, usize>(10)?.as_str())?,
        tracking_number: row.try_get(11)?,
        courier_name: row.try_get(12)?,
        created_at: col_datetime(row, 13)?,
    })
}

fn to_line_model(row: &MySqlRow) -> DefaultResult<(String, OrderLineModel), AppError> {
    let oid = row.try_get::<String, usize>(0)?;
    let line = OrderLineModel {
        product_id: row.try_get(2)?,
        name: row.try_get(3)?,
        unit_price: row.try_get(4)?,
        quantity: row.try_get(5)?,
        image: row.try_get(6)?,
    };
    Ok((oid, line))
}

pub(crate) struct OrderMariaDbRepo {
    db: Arc<AppMariaDbStore>,
}

impl OrderMariaDbRepo {
    pub(crate) fn new(dbs: Vec<Arc<AppMariaDbStore>>) -> DefaultResult<Self, AppError> {
        let db = dbs.first().cloned().ok_or(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { db })
    }

    async fn load_lines(
        &self,
        order_ids: Vec<String>,
    ) -> DefaultResult<HashMap<String, Vec<OrderLineModel>>, AppError> {
        let mut out: HashMap<String, Vec<OrderLineModel>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(out);
        }
        let placeholders = (0..order_ids.len())
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(",");
        let sql_patt = format!(
            "SELECT `order_id`,`seq`,`product_id`,`name`,`unit_price`,`quantity`,`image` \
             FROM `order_line` WHERE `order_id` IN ({placeholders}) ORDER BY `order_id`,`seq`"
        );
        let mut args = MySqlArguments::default();
        order_ids.iter().map(|oid| args.add(oid.as_str())).count();
        let mut conn = self.db.acquire().await?;
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let query = stmt.query_with(args);
        let exec = conn.deref_mut();
        let mut row_stream = query.fetch(exec);
        while let Some(row) = row_stream.try_next().await? {
            let (oid, line) = to_line_model(&row)?;
            out.entry(oid).or_default().push(line);
        }
        Ok(out)
    } // end of fn load_lines

    async fn attach_lines(
        &self,
        mut orders: Vec<OrderModel>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let ids = orders.iter().map(|o| o.order_id.clone()).collect();
        let mut line_map = self.load_lines(ids).await?;
        for o in orders.iter_mut() {
            if let Some(lines) = line_map.remove(o.order_id.as_str()) {
                o.lines = lines;
            }
        }
        Ok(orders)
    }
} // end of impl OrderMariaDbRepo

#[async_trait]
impl AbsOrderRepo for OrderMariaDbRepo {
    async fn create(
        &self,
        order: OrderModel,
        accrual: Option<CommissionAccrualModel>,
    ) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        // top-level row, order lines and the partner aggregate update
        // commit or roll back together
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = InsertTopLvlArg(&order).try_into()?;
        let _rs = run_query_once(&mut tx, sql_patt, args, Some(1)).await?;
        if !order.lines.is_empty() {
            let num_batch = order.lines.len();
            let arg = InsertLinesArg(order.order_id.clone(), order.lines.clone());
            let (sql_patt, args) = arg.into();
            let _rs = run_query_once(&mut tx, sql_patt, args, Some(num_batch)).await?;
        }
        if let Some(a) = accrual.as_ref() {
            let (sql_patt, args) = AccrualArg(a).into();
            let _rs = run_query_once(&mut tx, sql_patt, args, Some(1)).await?;
        }
        tx.commit().await?;
        Ok(())
    } // end of fn create

    async fn fetch_all(&self) -> DefaultResult<Vec<OrderModel>, AppError> {
        let mut conn = self.db.acquire().await?;
        let sql_patt = format!(
            "SELECT {TOPLVL_SELECT_COLUMNS} FROM `order_toplvl` ORDER BY `created_at` DESC"
        );
        let rows = fetch_all_rows(&mut conn, sql_patt, MySqlArguments::default()).await?;
        drop(conn);
        let orders = rows
            .iter()
            .map(to_toplvl_model)
            .collect::<DefaultResult<Vec<_>, AppError>>()?;
        self.attach_lines(orders).await
    }

    async fn fetch_by_id(&self, order_id: &str) -> DefaultResult<Option<OrderModel>, AppError> {
        let sql_patt = format!("SELECT {TOPLVL_SELECT_COLUMNS} FROM `order_toplvl` WHERE `order_id`=?");
        let mut args = MySqlArguments::default();
        args.add(order_id);
        let mut conn = self.db.acquire().await?;
        let maybe_row = fetch_one_row(&mut conn, sql_patt, args).await?;
        drop(conn);
        match maybe_row {
            Some(row) => {
                let order = to_toplvl_model(&row)?;
                let mut with_lines = self.attach_lines(vec![order]).await?;
                Ok(with_lines.pop())
            }
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
        if status.is_none() && tracking_number.is_none() && courier_name.is_none() {
            return Err(AppError {
                code: AppErrorCode::EmptyInputData,
                detail: Some("fulfillment-update".to_string()),
            });
        }
        {
            let mut conn = self.db.acquire().await?;
            let mut tx = conn.begin().await?;
            let arg = UpdateFulfillmentArg {
                order_id,
                status,
                tracking_number,
                courier_name,
            };
            let (sql_patt, args) = arg.into();
            let _rs = run_query_once(&mut tx, sql_patt, args, None).await?;
            tx.commit().await?;
        }
        self.fetch_by_id(order_id).await?.ok_or(AppError {
            code: AppErrorCode::ObjectNotExist,
            detail: Some(format!("order:{order_id}")),
        })
    }

    async fn fetch_by_partner_code(
        &self,
        code: &str,
        since: Option<DateTime<FixedOffset>>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let mut args = MySqlArguments::default();
        let sql_patt = if let Some(s) = since {
            args.add(code);
            args.add(s.to_rfc3339());
            format!(
                "SELECT {TOPLVL_SELECT_COLUMNS} FROM `order_toplvl` WHERE `partner_code`=? \
                 AND `created_at`>=? ORDER BY `created_at` DESC"
            )
        } else {
            args.add(code);
            format!(
                "SELECT {TOPLVL_SELECT_COLUMNS} FROM `order_toplvl` WHERE `partner_code`=? \
                 ORDER BY `created_at` DESC"
            )
        };
        let mut conn = self.db.acquire().await?;
        let rows = fetch_all_rows(&mut conn, sql_patt, args).await?;
        drop(conn);
        let orders = rows
            .iter()
            .map(to_toplvl_model)
            .collect::<DefaultResult<Vec<_>, AppError>>()?;
        self.attach_lines(orders).await
    }
} // end of impl AbsOrderRepo for OrderMariaDbRepo
