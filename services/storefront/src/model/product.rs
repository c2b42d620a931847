use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::ProductDto;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}
impl FromStr for ProductStatus {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _others => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("product-status:{s}")),
            }),
        }
    }
}

// flags deciding which curated storefront collections a product shows up in
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductCollectionFlags {
    pub season_best: bool,
    pub featured: bool,
    pub new_arrival: bool,
    pub organic_collection: bool,
    pub top_rated: bool,
}

#[derive(Debug, Clone)]
pub struct ProductModel {
    pub id: String,
    pub name: String,
    pub english_name: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub weight: String,
    pub image: String,
    pub category: String,
    pub tags: Vec<String>,
    pub stock: u32,
    pub rating: Decimal,
    pub num_reviews: u32,
    pub collections: ProductCollectionFlags,
    pub status: ProductStatus,
    pub created_at: DateTime<FixedOffset>,
}

impl ProductModel {
    pub fn validate(&self) -> DefaultResult<(), AppError> {
        if self.name.trim().is_empty() {
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some("product-name-empty".to_string()),
            })
        } else if self.price.is_sign_negative() {
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some("product-price-negative".to_string()),
            })
        } else if self
            .original_price
            .map(|p| p.is_sign_negative())
            .unwrap_or(false)
        {
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some("product-original-price-negative".to_string()),
            })
        } else if self.image.trim().is_empty() {
            Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some("product-image-empty".to_string()),
            })
        } else {
            Ok(())
        }
    }
}

impl From<ProductModel> for ProductDto {
    fn from(value: ProductModel) -> ProductDto {
        ProductDto {
            id: value.id,
            name: value.name,
            english_name: value.english_name,
            description: value.description,
            price: value.price,
            original_price: value.original_price,
            weight: value.weight,
            image: value.image,
            category: value.category,
            tags: value.tags,
            stock: value.stock,
            rating: value.rating,
            reviews: value.num_reviews,
            is_season_best: value.collections.season_best,
            is_featured: value.collections.featured,
            is_new_arrival: value.collections.new_arrival,
            is_organic_collection: value.collections.organic_collection,
            is_top_rated: value.collections.top_rated,
            status: value.status.as_str().to_string(),
            created_at: value.created_at,
        }
    }
}
