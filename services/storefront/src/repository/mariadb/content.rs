use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsnVal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Acquire, Arguments, Row};

use ecommerce_common::error::AppErrorCode;

use super::super::AbsContentRepo;
use super::{col_datetime, fetch_all_rows, fetch_one_row, run_query_once};
use crate::datastore::AppMariaDbStore;
use crate::error::AppError;
use crate::model::{ContentSectionModel, ContentValue};

struct UpsertArg<'a>(&'a ContentSectionModel);

impl<'a> TryFrom<UpsertArg<'a>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: UpsertArg<'a>) -> DefaultResult<(String, MySqlArguments), AppError> {
        let sql_patt = "INSERT INTO `content_section`(`section`,`entries`,`updated_at`) \
             VALUES (?,?,?) ON DUPLICATE KEY UPDATE `entries`=?,`updated_at`=?";
        let m = value.0;
        let serial = {
            let flattened = m
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), JsnVal::from(v.clone())))
                .collect::<serde_json::Map<String, JsnVal>>();
            serde_json::to_string(&flattened).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?
        };
        let updated_at = m.updated_at.to_rfc3339();
        let mut args = MySqlArguments::default();
        args.add(m.section.as_str());
        args.add(serial.as_str());
        args.add(updated_at.as_str());
        args.add(serial.as_str());
        args.add(updated_at.as_str());
        Ok((sql_patt.to_string(), args))
    }
}

fn to_model(row: &MySqlRow) -> DefaultResult<ContentSectionModel, AppError> {
    let entries = {
        let raw = row.try_get::<String, usize>(1)?;
        let flattened: serde_json::Map<String, JsnVal> = serde_json::from_str(raw.as_str())
            .map_err(|e| AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(e.to_string()),
            })?;
        flattened
            .into_iter()
            .map(|(k, v)| (k, ContentValue::from(v)))
            .collect::<HashMap<String, ContentValue>>()
    };
    Ok(ContentSectionModel {
        section: row.try_get(0)?,
        entries,
        updated_at: col_datetime(row, 2)?,
    })
}

pub(crate) struct ContentMariaDbRepo {
    db: Arc<AppMariaDbStore>,
}

impl ContentMariaDbRepo {
    pub(crate) fn new(dbs: Vec<Arc<AppMariaDbStore>>) -> DefaultResult<Self, AppError> {
        let db = dbs.first().cloned().ok_or(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { db })
    }
}

#[async_trait]
impl AbsContentRepo for ContentMariaDbRepo {
    async fn fetch_section(
        &self,
        section: &str,
    ) -> DefaultResult<Option<ContentSectionModel>, AppError> {
        let sql_patt =
            "SELECT `section`,`entries`,`updated_at` FROM `content_section` WHERE `section`=?";
        let mut args = MySqlArguments::default();
        args.add(section);
        let mut conn = self.db.acquire().await?;
        let maybe_row = fetch_one_row(&mut conn, sql_patt.to_string(), args).await?;
        match maybe_row {
            Some(row) => Ok(Some(to_model(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<ContentSectionModel>, AppError> {
        let sql_patt =
            "SELECT `section`,`entries`,`updated_at` FROM `content_section` ORDER BY `section`";
        let mut conn = self.db.acquire().await?;
        let rows =
            fetch_all_rows(&mut conn, sql_patt.to_string(), MySqlArguments::default()).await?;
        rows.iter().map(to_model).collect()
    }

    async fn upsert(&self, section: ContentSectionModel) -> DefaultResult<(), AppError> {
        let mut conn = self.db.acquire().await?;
        let mut tx = conn.begin().await?;
        let (sql_patt, args) = UpsertArg(&section).try_into()?;
        let _rs = run_query_once(&mut tx, sql_patt, args, None).await?;
        tx.commit().await?;
        Ok(())
    }
} // end of impl AbsContentRepo for ContentMariaDbRepo
