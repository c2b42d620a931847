use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{ProductCreateReqDto, ProductDto, ProductUpdateReqDto};
use crate::error::AppError;
use crate::generate_doc_id;
use crate::model::{ProductCollectionFlags, ProductModel, ProductStatus};
use crate::repository::AbsProductRepo;

pub enum ProductUcError {
    NotFound,
    ReqContent(String),
    Server(AppError),
}

impl From<AppError> for ProductUcError {
    fn from(value: AppError) -> Self {
        match value.code {
            AppErrorCode::ObjectNotExist => Self::NotFound,
            AppErrorCode::InvalidInput => {
                Self::ReqContent(value.detail.unwrap_or("invalid-input".to_string()))
            }
            ref _others => Self::Server(value),
        }
    }
}

const DEFAULT_RATING: u32 = 5;

pub struct CreateProductUseCase {
    pub repo: Box<dyn AbsProductRepo>,
}

impl CreateProductUseCase {
    pub async fn execute(
        self,
        data: ProductCreateReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<ProductDto, ProductUcError> {
        let status = match data.status.as_ref() {
            Some(s) => ProductStatus::from_str(s.as_str())?,
            None => ProductStatus::Active,
        };
        let item = ProductModel {
            id: generate_doc_id(),
            name: data.name,
            english_name: data.english_name,
            description: data.description,
            price: data.price,
            original_price: data.original_price,
            weight: data.weight,
            image: data.image,
            category: data.category,
            tags: data.tags,
            stock: data.stock,
            rating: Decimal::from(DEFAULT_RATING),
            num_reviews: 0,
            collections: ProductCollectionFlags {
                season_best: data.is_season_best,
                featured: data.is_featured,
                new_arrival: data.is_new_arrival,
                organic_collection: data.is_organic_collection,
                top_rated: data.is_top_rated,
            },
            status,
            created_at: now,
        };
        item.validate()?;
        self.repo.create(item.clone()).await?;
        Ok(item.into())
    } // end of fn execute
} // end of impl CreateProductUseCase

pub struct EditProductUseCase {
    pub repo: Box<dyn AbsProductRepo>,
}

impl EditProductUseCase {
    pub async fn execute(self, data: ProductUpdateReqDto) -> DefaultResult<ProductDto, ProductUcError> {
        let mut item = self
            .repo
            .fetch(data.id.as_str())
            .await?
            .ok_or(ProductUcError::NotFound)?;
        if let Some(v) = data.name {
            item.name = v;
        }
        if data.english_name.is_some() {
            item.english_name = data.english_name;
        }
        if data.description.is_some() {
            item.description = data.description;
        }
        if let Some(v) = data.price {
            item.price = v;
        }
        if data.original_price.is_some() {
            item.original_price = data.original_price;
        }
        if let Some(v) = data.weight {
            item.weight = v;
        }
        if let Some(v) = data.image {
            item.image = v;
        }
        if let Some(v) = data.category {
            item.category = v;
        }
        if let Some(v) = data.tags {
            item.tags = v;
        }
        if let Some(v) = data.stock {
            item.stock = v;
        }
        if let Some(v) = data.is_season_best {
            item.collections.season_best = v;
        }
        if let Some(v) = data.is_featured {
            item.collections.featured = v;
        }
        if let Some(v) = data.is_new_arrival {
            item.collections.new_arrival = v;
        }
        if let Some(v) = data.is_organic_collection {
            item.collections.organic_collection = v;
        }
        if let Some(v) = data.is_top_rated {
            item.collections.top_rated = v;
        }
        if let Some(s) = data.status {
            item.status = ProductStatus::from_str(s.as_str())?;
        }
        item.validate()?;
        self.repo.update(item.clone()).await?;
        Ok(item.into())
    } // end of fn execute
} // end of impl EditProductUseCase

pub struct ListProductsUseCase {
    pub repo: Box<dyn AbsProductRepo>,
}

impl ListProductsUseCase {
    pub async fn execute(self, active_only: bool) -> DefaultResult<Vec<ProductDto>, AppError> {
        let items = self.repo.fetch_all(active_only).await?;
        Ok(items.into_iter().map(ProductDto::from).collect())
    }
}
