use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use ecommerce_common::error::AppErrorCode;

use super::super::AbsProductRepo;
use super::{
    fmt_bool, fmt_opt, opt_cell, parse_bool, parse_datetime, parse_decimal, parse_int, row_column,
    MatchAllKeysOp,
};
use crate::datastore::AbstInMemoryDStore;
use crate::error::AppError;
use crate::model::{ProductCollectionFlags, ProductModel, ProductStatus};

const TABLE_LABEL: &str = "product";

enum InMemColIdx {
    Name,
    EnglishName,
    Description,
    Price,
    OriginalPrice,
    Weight,
    Image,
    Category,
    Tags,
    Stock,
    Rating,
    NumReviews,
    SeasonBest,
    Featured,
    NewArrival,
    OrganicCollection,
    TopRated,
    Status,
    CreatedAt,
    TotNumColumns,
}

impl From<InMemColIdx> for usize {
    fn from(value: InMemColIdx) -> usize {
        match value {
            InMemColIdx::Name => 0,
            InMemColIdx::EnglishName => 1,
            InMemColIdx::Description => 2,
            InMemColIdx::Price => 3,
            InMemColIdx::OriginalPrice => 4,
            InMemColIdx::Weight => 5,
            InMemColIdx::Image => 6,
            InMemColIdx::Category => 7,
            InMemColIdx::Tags => 8,
            InMemColIdx::Stock => 9,
            InMemColIdx::Rating => 10,
            InMemColIdx::NumReviews => 11,
            InMemColIdx::SeasonBest => 12,
            InMemColIdx::Featured => 13,
            InMemColIdx::NewArrival => 14,
            InMemColIdx::OrganicCollection => 15,
            InMemColIdx::TopRated => 16,
            InMemColIdx::Status => 17,
            InMemColIdx::CreatedAt => 18,
            InMemColIdx::TotNumColumns => 19,
        }
    }
}

fn to_row(m: &ProductModel) -> DefaultResult<Vec<String>, AppError> {
    let tags = serde_json::to_string(&m.tags).map_err(|e| AppError {
        code: AppErrorCode::InvalidInput,
        detail: Some(e.to_string()),
    })?;
    let mut row = (0..InMemColIdx::TotNumColumns.into())
        .map(|_n| String::new())
        .collect::<Vec<String>>();
    let _ = [
        (InMemColIdx::Name, m.name.clone()),
        (InMemColIdx::EnglishName, fmt_opt(&m.english_name)),
        (InMemColIdx::Description, fmt_opt(&m.description)),
        (InMemColIdx::Price, m.price.to_string()),
        (InMemColIdx::OriginalPrice, fmt_opt(&m.original_price)),
        (InMemColIdx::Weight, m.weight.clone()),
        (InMemColIdx::Image, m.image.clone()),
        (InMemColIdx::Category, m.category.clone()),
        (InMemColIdx::Tags, tags),
        (InMemColIdx::Stock, m.stock.to_string()),
        (InMemColIdx::Rating, m.rating.to_string()),
        (InMemColIdx::NumReviews, m.num_reviews.to_string()),
        (InMemColIdx::SeasonBest, fmt_bool(m.collections.season_best)),
        (InMemColIdx::Featured, fmt_bool(m.collections.featured)),
        (InMemColIdx::NewArrival, fmt_bool(m.collections.new_arrival)),
        (
            InMemColIdx::OrganicCollection,
            fmt_bool(m.collections.organic_collection),
        ),
        (InMemColIdx::TopRated, fmt_bool(m.collections.top_rated)),
        (InMemColIdx::Status, m.status.as_str().to_string()),
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

fn to_model(id: &str, row: &[String]) -> DefaultResult<ProductModel, AppError> {
    let tags: Vec<String> = serde_json::from_str(row_column(row, InMemColIdx::Tags.into())?)
        .map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(e.to_string()),
        })?;
    let original_price = match opt_cell(row_column(row, InMemColIdx::OriginalPrice.into())?) {
        Some(s) => Some(parse_decimal(s.as_str())?),
        None => None,
    };
    let collections = ProductCollectionFlags {
        season_best: parse_bool(row_column(row, InMemColIdx::SeasonBest.into())?)?,
        featured: parse_bool(row_column(row, InMemColIdx::Featured.into())?)?,
        new_arrival: parse_bool(row_column(row, InMemColIdx::NewArrival.into())?)?,
        organic_collection: parse_bool(row_column(row, InMemColIdx::OrganicCollection.into())?)?,
        top_rated: parse_bool(row_column(row, InMemColIdx::TopRated.into())?)?,
    };
    Ok(ProductModel {
        id: id.to_string(),
        name: row_column(row, InMemColIdx::Name.into())?.clone(),
        english_name: opt_cell(row_column(row, InMemColIdx::EnglishName.into())?),
        description: opt_cell(row_column(row, InMemColIdx::Description.into())?),
        price: parse_decimal(row_column(row, InMemColIdx::Price.into())?)?,
        original_price,
        weight: row_column(row, InMemColIdx::Weight.into())?.clone(),
        image: row_column(row, InMemColIdx::Image.into())?.clone(),
        category: row_column(row, InMemColIdx::Category.into())?.clone(),
        tags,
        stock: parse_int(row_column(row, InMemColIdx::Stock.into())?)?,
        rating: parse_decimal(row_column(row, InMemColIdx::Rating.into())?)?,
        num_reviews: parse_int(row_column(row, InMemColIdx::NumReviews.into())?)?,
        collections,
        status: ProductStatus::from_str(row_column(row, InMemColIdx::Status.into())?)?,
        created_at: parse_datetime(row_column(row, InMemColIdx::CreatedAt.into())?)?,
    })
} // end of fn to_model

pub struct ProductInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl ProductInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }
}

#[async_trait]
impl AbsProductRepo for ProductInMemRepo {
    async fn create(&self, item: ProductModel) -> DefaultResult<(), AppError> {
        let row = to_row(&item)?;
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(item.id.clone(), row)]),
        )]);
        let _num = self.datastore.save(data).await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> DefaultResult<Option<ProductModel>, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![id.to_string()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched.get(TABLE_LABEL).and_then(|t| t.get(id));
        match found {
            Some(row) => Ok(Some(to_model(id, row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all(&self, active_only: bool) -> DefaultResult<Vec<ProductModel>, AppError> {
        let op = MatchAllKeysOp;
        let ids = self.datastore.filter_keys(TABLE_LABEL.to_string(), &op).await?;
        let keys = HashMap::from([(TABLE_LABEL.to_string(), ids)]);
        let fetched = self.datastore.fetch(keys).await?;
        let mut out = Vec::new();
        if let Some(t) = fetched.get(TABLE_LABEL) {
            for (id, row) in t.iter() {
                let m = to_model(id, row)?;
                if !active_only || matches!(m.status, ProductStatus::Active) {
                    out.push(m);
                }
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn update(&self, item: ProductModel) -> DefaultResult<(), AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![item.id.clone()])]);
        let (fetched, lock) = self.datastore.fetch_acquire(keys).await?;
        let exists = fetched
            .get(TABLE_LABEL)
            .map(|t| t.contains_key(item.id.as_str()))
            .unwrap_or(false);
        if !exists {
            return Err(AppError {
                code: AppErrorCode::ObjectNotExist,
                detail: Some(format!("product:{}", item.id)),
            });
        }
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(item.id.clone(), to_row(&item)?)]),
        )]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    }
} // end of impl AbsProductRepo for ProductInMemRepo
