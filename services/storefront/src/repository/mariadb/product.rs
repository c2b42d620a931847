use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Acquire, Arguments, Row};

use ecommerce_common::error::AppErrorCode;

use super::super::AbsProductRepo;
use super::{col_datetime, fetch_all_rows, fetch_one_row, run_query_once};
use crate::datastore::AppMariaDbStore;
use crate::error::AppError;
use crate::model::{ProductCollectionFlags, ProductModel, ProductStatus};

struct InsertArg<'a>(&'a ProductModel);
struct UpdateArg<'a>(&'a ProductModel);

const SELECT_COLUMNS: &str = "`id`,`name`,`english_name`,`description`,`price`,\
     `original_price`,`weight`,`image`,`category`,`tags`,`stock`,`rating`,`num_reviews`,\
     `is_season_best`,`is_featured`,`is_new_arrival`,`is_organic_collection`,`is_top_rated`,\
     `status`,`created_at`";

fn serialize_tags(tags: &[String]) -> DefaultResult<String, AppError> {
    serde_json::to_string(tags).map_err(|e| AppError {
        code: AppErrorCode::InvalidInput,
        detail: Some(e.to_string()),
    })
}

fn add_common_columns(args: &mut MySqlArguments, m: &ProductModel, tags: String) {
    args.add(m.name.as_str());
    args.add(m.english_name.clone());
    args.add(m.description.clone());
    args.add(m.price);
    args.add(m.original_price);
    args.add(m.weight.as_str());
    args.add(m.image.as_str());
    args.add(m.category.as_str());
    args.add(tags);
    args.add(m.stock);
    args.add(m.rating);
    args.add(m.num_reviews);
    args.add(m.collections.season_best);
    args.add(m.collections.featured);
    args.add(m.collections.new_arrival);
    args.add(m.collections.organic_collection);
    args.add(m.collections.top_rated);
    args.add(m.status.as_str());
}

impl<'a> TryFrom<InsertArg<'a>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: InsertArg<'a>) -> DefaultResult<(String, MySqlArguments), AppError> {
        let sql_patt = "INSERT INTO `product`(`id`,`name`,`english_name`,`description`,\
             `price`,`original_price`,`weight`,`image`,`category`,`tags`,`stock`,`rating`,\
             `num_reviews`,`is_season_best`,`is_featured`,`is_new_arrival`,\
             `is_organic_collection`,`is_top_rated`,`status`,`created_at`) \
             VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)";
        let m = value.0;
        let tags = serialize_tags(&m.tags)?;
        let mut args = MySqlArguments::default();
        args.add(m.id.as_str());
        add_common_columns(&mut args, m, tags);
        args.add(m.created_at.to_rfc3339());
        Ok((sql_patt.to_string(), args))
    }
}

impl<'a> TryFrom<UpdateArg<'a>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: UpdateArg<'a>) -> DefaultResult<(String, MySqlArguments), AppError> {
        let sql_patt = "UPDATE `product` SET `name`=?,`english_name`=?,`description`=?,\
             `price`=?,`original_price`=?,`weight`=?,`image`=?,`category`=?,`tags`=?,\
             `stock`=?,`rating`=?,`num_reviews`=?,`is_season_best`=?,`is_featured`=?,\
             `is_new_arrival`=?,`is_organic_collection`=?,`is_top_rated`=?,`status`=? \
             WHERE `id`=?";
        let m = value.0;
        let tags = serialize_tags(&m.tags)?;
        let mut args = MySqlArguments::default();
        add_common_columns(&mut args, m, tags);
        args.add(m.id.as_str());
        Ok((sql_patt.to_string(), args))
    }
}

fn to_model(row: &MySqlRow) -> DefaultResult<ProductModel, AppError> {
    let tags: Vec<String> = {
        let raw = row.try_get::<String, usize>(9)?;
        serde_json::from_str(raw.as_str()).map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(e.to_string()),
        })?
    };
    let collections = ProductCollectionFlags {
        season_best: row.try_get(13)?,
        featured: row.try_get(14)?,
        new_arrival: row.try_get(15)?,
        organic_collection: row.try_get(16)?,
        top_rated: row.try_get(17)?,
    };
    Ok(ProductModel {
        id: row.try_get(0)?,
        name: row.try_get(1)?,
        english_name: row.try_get(2)?,
        description: row.try_get(3)?,
        price: row.try_get(4)?,
        original_price: row.try_get(5)?,
        weight: row.try_get(6)?,
        image: row.try_get(7)?,
        category: row.try_get(8)?,
        tags,
        stock: row.try_get(10)?,
        rating: row.try_get(11)?,
        num_reviews: row.try_get(12)?,
        collections,
        status: ProductStatus::from_str(row.try_get::<String, usize>(18)?.as_str())?,
        created_at: col_datetime(row, 19)?,
    })
} // end of fn to_model

pub(crate) struct ProductMariaDbRepo {
    db: Arc<AppMariaDbStore>,
}

impl ProductMariaDbRepo {
    pub(crate) fn new(dbs: Vec<Arc<AppMariaDbStore>>) -> DefaultResult<Self, AppError> {
        let db = dbs.first().cloned().ok_or(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { db })
    }
}

#[async_trait]
impl AbsProductRepo for ProductMariaDbRepo {
    async fn create(&self, item: ProductModel) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = InsertArg(&item).try_into()?;
        let _rs = run_query_once(&mut tx, sql_patt, args, Some(1)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> DefaultResult<Option<ProductModel>, AppError> {
        let sql_patt = format!("SELECT {SELECT_COLUMNS} FROM `product` WHERE `id`=?");
        let mut args = MySqlArguments::default();
        args.add(id);
        let mut conn = self.db.acquire().await?;
        let maybe_row = fetch_one_row(&mut conn, sql_patt, args).await?;
        match maybe_row {
            Some(row) => Ok(Some(to_model(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all(&self, active_only: bool) -> DefaultResult<Vec<ProductModel>, AppError> {
        let sql_patt = if active_only {
            format!(
                "SELECT {SELECT_COLUMNS} FROM `product` WHERE `status`='active' \
                 ORDER BY `created_at` DESC"
            )
        } else {
            format!("SELECT {SELECT_COLUMNS} FROM `product` ORDER BY `created_at` DESC")
        };
        let mut conn = self.db.acquire().await?;
        let rows = fetch_all_rows(&mut conn, sql_patt, MySqlArguments::default()).await?;
        rows.iter().map(to_model).collect()
    }

    async fn update(&self, item: ProductModel) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = UpdateArg(&item).try_into()?;
        let rs = run_query_once(&mut tx, sql_patt, args, None).await?;
        tx.commit().await?;
        if rs.rows_affected() == 0 && self.fetch(item.id.as_str()).await?.is_none() {
            Err(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("product:{}", item.id)),
            })
        } else {
            Ok(())
        }
    }
} // end of impl AbsProductRepo for ProductMariaDbRepo
