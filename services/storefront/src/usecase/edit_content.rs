use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use serde_json::Value as JsnVal;

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::ContentUpdateReqDto;
use crate::error::AppError;
use crate::model::{ContentSectionModel, ContentValue};
use crate::repository::AbsContentRepo;

pub enum ContentUcError {
    ReqContent(String),
    Server(AppError),
}

impl From<AppError> for ContentUcError {
    fn from(value: AppError) -> Self {
        match value.code {
            AppErrorCode::InvalidInput | AppErrorCode::EmptyInputData => {
                Self::ReqContent(value.detail.unwrap_or("invalid-input".to_string()))
            }
            ref _others => Self::Server(value),
        }
    }
}

/// flattened `{key: value}` view consumed by the public pages, one section
/// when a filter is given, every section merged together otherwise
pub struct FetchContentUseCase {
    pub repo: Box<dyn AbsContentRepo>,
}

impl FetchContentUseCase {
    pub async fn execute(
        self,
        section: Option<String>,
    ) -> DefaultResult<HashMap<String, JsnVal>, AppError> {
        let sections = match section {
            Some(name) => match self.repo.fetch_section(name.as_str()).await? {
                Some(s) => vec![s],
                None => Vec::new(),
            },
            None => self.repo.fetch_all().await?,
        };
        let mut out = HashMap::new();
        for s in sections {
            for (k, v) in s.entries {
                let _prev = out.insert(k, JsnVal::from(v));
            }
        }
        Ok(out)
    }
} // end of impl FetchContentUseCase

pub struct EditContentUseCase {
    pub repo: Box<dyn AbsContentRepo>,
}

impl EditContentUseCase {
    pub async fn execute(
        self,
        data: ContentUpdateReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<(), ContentUcError> {
        let updates = data
            .updates
            .into_iter()
            .map(|(k, v)| (k, ContentValue::from(v)))
            .collect::<HashMap<String, ContentValue>>();
        // unknown section names and mismatched value kinds are rejected
        // before anything is written
        ContentSectionModel::validate_write(data.section.as_str(), &updates)?;
        let mut section = self
            .repo
            .fetch_section(data.section.as_str())
            .await?
            .unwrap_or(ContentSectionModel {
                section: data.section.clone(),
                entries: HashMap::new(),
                updated_at: now,
            });
        section.merge_entries(updates);
        section.updated_at = now;
        self.repo.upsert(section).await?;
        Ok(())
    } // end of fn execute
} // end of impl EditContentUseCase
