use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use ecommerce_common::config::AppInMemoryDbCfg;
use ecommerce_common::error::AppErrorCode;

use crate::error::AppError;

// simple document storage kept in process memory, the default backend when
// no database server is configured.
//
// application callers are responsible to maintain the structure of each row
// in each table, every element of a row is stringified regardless of its
// original type (integer, decimal, timestamp, serialized JSON)
type InnerRow = Vec<String>;
type InnerTable = HashMap<String, InnerRow>;
type AllTable = HashMap<String, InnerTable>;

pub type AppInMemUpdateData = AllTable;
pub type AppInMemFetchKeys = HashMap<String, Vec<String>>; // list of IDs per table
pub type AppInMemDeleteInfo = AppInMemFetchKeys;
pub type AppInMemFetchedSingleRow = InnerRow;
pub type AppInMemFetchedSingleTable = InnerTable;
pub type AppInMemFetchedData = AllTable;

// guard held by a caller between `fetch_acquire` and `save_release`, any
// other task touching the same store blocks until it is dropped, which makes
// a read-modify-write sequence atomic
pub struct AppInMemDstoreLock {
    guard: OwnedMutexGuard<AllTable>,
}

pub trait AbsDStoreFilterKeyOp: Sync {
    fn filter(&self, k: &String, v: &Vec<String>) -> bool;
}

#[async_trait]
pub trait AbstInMemoryDStore: Send + Sync {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError>;
    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError>;
    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError>;
    async fn fetch(&self, keys: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError>;
    async fn fetch_acquire(
        &self,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError>;
    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError>;
    async fn filter_keys(
        &self,
        table: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError>;
}

pub struct AppInMemoryDStore {
    max_items_per_table: u32,
    table_map: Arc<Mutex<AllTable>>,
}

impl AppInMemoryDStore {
    pub fn new(cfg: &AppInMemoryDbCfg) -> Self {
        Self {
            table_map: Arc::new(Mutex::new(HashMap::new())),
            max_items_per_table: cfg.max_items,
        }
    }

    fn _check_capacity(&self, map: &AllTable) -> DefaultResult<(), AppError> {
        let mut invalid = map
            .iter()
            .filter(|(_, table)| self.max_items_per_table as usize <= table.len());
        if let Some((label, _)) = invalid.next() {
            let msg = format!("{}, {}", module_path!(), label);
            Err(AppError {
                detail: Some(msg),
                code: AppErrorCode::ExceedingMaxLimit,
            })
        } else {
            Ok(())
        }
    }

    fn _check_table_existence<'a, I>(map: &AllTable, labels: I) -> DefaultResult<(), AppError>
    where
        I: Iterator<Item = &'a String>,
    {
        let mut invalid = labels.filter(|label| !map.contains_key(label.as_str()));
        if let Some(d) = invalid.next() {
            Err(AppError {
                detail: Some(d.to_string()),
                code: AppErrorCode::DataTableNotExist,
            })
        } else {
            Ok(())
        }
    }

    fn _apply_update(map: &mut AllTable, data: AppInMemUpdateData) -> usize {
        data.into_iter()
            .map(|(label, d_grp)| {
                let table = map.get_mut(label.as_str()).unwrap();
                d_grp
                    .into_iter()
                    .map(|(id, row)| {
                        let _prev = table.insert(id, row);
                    })
                    .count()
            })
            .sum()
    }

    fn _collect_rows(map: &AllTable, keys: AppInMemFetchKeys) -> AppInMemFetchedData {
        let iter = keys.into_iter().map(|(label, ids)| {
            let rows = if let Some(table) = map.get(label.as_str()) {
                let kv_iter = ids
                    .iter()
                    .filter_map(|id| table.get(id).map(|row| (id.clone(), row.clone())));
                HashMap::from_iter(kv_iter)
            } else {
                HashMap::new()
            };
            (label, rows)
        });
        HashMap::from_iter(iter)
    }
} // end of impl AppInMemoryDStore

#[async_trait]
impl AbstInMemoryDStore for AppInMemoryDStore {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError> {
        let mut map = self.table_map.lock().await;
        if !map.contains_key(label) {
            let _prev = map.insert(label.to_string(), HashMap::new());
        }
        Ok(())
    }

    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError> {
        let mut map = self.table_map.lock().await;
        Self::_check_table_existence(&map, data.keys())?;
        self._check_capacity(&map)?;
        let tot_cnt = Self::_apply_update(&mut map, data);
        self._check_capacity(&map)?;
        Ok(tot_cnt)
    }

    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError> {
        let mut map = self.table_map.lock().await;
        Self::_check_table_existence(&map, info.keys())?;
        let tot_cnt = info
            .iter()
            .map(|(label, ids)| {
                let table = map.get_mut(label.as_str()).unwrap();
                ids.iter().filter(|id| table.remove(*id).is_some()).count()
            })
            .sum();
        Ok(tot_cnt)
    }

    async fn fetch(&self, keys: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError> {
        let map = self.table_map.lock().await;
        Self::_check_table_existence(&map, keys.keys())?;
        Ok(Self::_collect_rows(&map, keys))
    }

    async fn fetch_acquire(
        &self,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError> {
        let guard = self.table_map.clone().lock_owned().await;
        Self::_check_table_existence(&guard, keys.keys())?;
        let fetched = Self::_collect_rows(&guard, keys);
        Ok((fetched, AppInMemDstoreLock { guard }))
    }

    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError> {
        let mut guard = lock.guard;
        Self::_check_table_existence(&guard, data.keys())?;
        self._check_capacity(&guard)?;
        let tot_cnt = Self::_apply_update(&mut guard, data);
        self._check_capacity(&guard)?;
        Ok(tot_cnt)
    } // guard dropped at here, other tasks resume

    async fn filter_keys(
        &self,
        table: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError> {
        let map = self.table_map.lock().await;
        let t = map.get(table.as_str()).ok_or(AppError {
            detail: Some(table.clone()),
            code: AppErrorCode::DataTableNotExist,
        })?;
        let out = t
            .iter()
            .filter(|(k, v)| op.filter(k, v))
            .map(|(k, _v)| k.clone())
            .collect();
        Ok(out)
    }
} // end of impl AbstInMemoryDStore for AppInMemoryDStore
