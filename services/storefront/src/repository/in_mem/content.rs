use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsnVal;

use ecommerce_common::error::AppErrorCode;

use super::super::AbsContentRepo;
use super::{parse_datetime, row_column, MatchAllKeysOp};
use crate::datastore::AbstInMemoryDStore;
use crate::error::AppError;
use crate::model::{ContentSectionModel, ContentValue};

const TABLE_LABEL: &str = "content_section";

enum InMemColIdx {
    Entries,
    UpdatedAt,
    TotNumColumns,
}
impl From<InMemColIdx> for usize {
    fn from(value: InMemColIdx) -> usize {
        match value {
            InMemColIdx::Entries => 0,
            InMemColIdx::UpdatedAt => 1,
            InMemColIdx::TotNumColumns => 2,
        }
    }
}

fn to_row(m: &ContentSectionModel) -> DefaultResult<Vec<String>, AppError> {
    let flattened = m
        .entries
        .iter()
        .map(|(k, v)| (k.clone(), JsnVal::from(v.clone())))
        .collect::<serde_json::Map<String, JsnVal>>();
    let serial = serde_json::to_string(&flattened).map_err(|e| AppError {
        code: AppErrorCode::InvalidInput,
        detail: Some(e.to_string()),
    })?;
    let mut row = (0..InMemColIdx::TotNumColumns.into())
        .map(|_n| String::new())
        .collect::<Vec<String>>();
    row[usize::from(InMemColIdx::Entries)] = serial;
    row[usize::from(InMemColIdx::UpdatedAt)] = m.updated_at.to_rfc3339();
    Ok(row)
}

fn to_model(section: &str, row: &[String]) -> DefaultResult<ContentSectionModel, AppError> {
    let raw = row_column(row, InMemColIdx::Entries.into())?;
    let flattened: serde_json::Map<String, JsnVal> =
        serde_json::from_str(raw).map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(e.to_string()),
        })?;
    let entries = flattened
        .into_iter()
        .map(|(k, v)| (k, ContentValue::from(v)))
        .collect::<HashMap<String, ContentValue>>();
    Ok(ContentSectionModel {
        section: section.to_string(),
        entries,
        updated_at: parse_datetime(row_column(row, InMemColIdx::UpdatedAt.into())?)?,
    })
}

pub struct ContentInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl ContentInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }
}

#[async_trait]
impl AbsContentRepo for ContentInMemRepo {
    async fn fetch_section(
        &self,
        section: &str,
    ) -> DefaultResult<Option<ContentSectionModel>, AppError> {
        let keys = HashMap::from([(TABLE_LABEL.to_string(), vec![section.to_string()])]);
        let fetched = self.datastore.fetch(keys).await?;
        let found = fetched.get(TABLE_LABEL).and_then(|t| t.get(section));
        match found {
            Some(row) => Ok(Some(to_model(section, row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<ContentSectionModel>, AppError> {
        let op = MatchAllKeysOp;
        let names = self.datastore.filter_keys(TABLE_LABEL.to_string(), &op).await?;
        let keys = HashMap::from([(TABLE_LABEL.to_string(), names)]);
        let fetched = self.datastore.fetch(keys).await?;
        let mut out = Vec::new();
        if let Some(t) = fetched.get(TABLE_LABEL) {
            for (section, row) in t.iter() {
                out.push(to_model(section, row)?);
            }
        }
        out.sort_by(|a, b| a.section.cmp(&b.section));
        Ok(out)
    }

    async fn upsert(&self, section: ContentSectionModel) -> DefaultResult<(), AppError> {
        let row = to_row(&section)?;
        let data = HashMap::from([(
            TABLE_LABEL.to_string(),
            HashMap::from([(section.section.clone(), row)]),
        )]);
        let _num = self.datastore.save(data).await?;
        Ok(())
    }
} // end of impl AbsContentRepo for ContentInMemRepo
