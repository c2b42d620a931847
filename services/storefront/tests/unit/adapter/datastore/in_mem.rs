use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};

use ecommerce_common::config::AppInMemoryDbCfg;
use ecommerce_common::error::AppErrorCode;

use storefront::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemDeleteInfo, AppInMemFetchKeys,
    AppInMemUpdateData, AppInMemoryDStore,
};

const UT_TABLE_LABEL_A: &str = "app-table-12";
const UT_TABLE_LABEL_B: &str = "app-table-34";

fn ut_dstore(max_items: u32) -> AppInMemoryDStore {
    let cfg = AppInMemoryDbCfg {
        alias: "utest".to_string(),
        max_items,
    };
    AppInMemoryDStore::new(&cfg)
}

fn ut_row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn save_fetch_ok() {
    let dstore = ut_dstore(10);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    dstore.create_table(UT_TABLE_LABEL_B).await.unwrap();
    let new_data: AppInMemUpdateData = {
        let t1 = HashMap::from([
            ("G802".to_string(), ut_row(&["tee", "0.076", "1827"])),
            ("GIj0e".to_string(), ut_row(&["hie", "1.3689", "20"])),
        ]);
        HashMap::from([(UT_TABLE_LABEL_A.to_string(), t1)])
    };
    let num = dstore.save(new_data).await.unwrap();
    assert_eq!(num, 2);

    let fetching_keys: AppInMemFetchKeys = HashMap::from([
        (
            UT_TABLE_LABEL_A.to_string(),
            vec!["GIj0e".to_string(), "absent".to_string()],
        ),
        (UT_TABLE_LABEL_B.to_string(), vec!["whatever".to_string()]),
    ]);
    let fetched = dstore.fetch(fetching_keys).await.unwrap();
    let a_table = fetched.get(UT_TABLE_LABEL_A).unwrap();
    assert_eq!(a_table.get("GIj0e").unwrap(), &ut_row(&["hie", "1.3689", "20"]));
    assert!(a_table.get("absent").is_none());
    assert!(fetched.get(UT_TABLE_LABEL_B).unwrap().is_empty());
}

#[tokio::test]
async fn save_overwrites_row() {
    let dstore = ut_dstore(10);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([("G802".to_string(), ut_row(&["tee", "1827"]))]),
    )]);
    let _num = dstore.save(data).await.unwrap();
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([("G802".to_string(), ut_row(&["shreding", "52"]))]),
    )]);
    let _num = dstore.save(data).await.unwrap();
    let keys = HashMap::from([(UT_TABLE_LABEL_A.to_string(), vec!["G802".to_string()])]);
    let fetched = dstore.fetch(keys).await.unwrap();
    let row = fetched.get(UT_TABLE_LABEL_A).unwrap().get("G802").unwrap();
    assert_eq!(row, &ut_row(&["shreding", "52"]));
}

#[tokio::test]
async fn fetch_acquire_save_release_ok() {
    let dstore = ut_dstore(10);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([
            ("yoLo".to_string(), ut_row(&["sbitz", "59"])),
            ("Alie".to_string(), ut_row(&["kay", "1007"])),
        ]),
    )]);
    let _num = dstore.save(data).await.unwrap();
    let keys = HashMap::from([(UT_TABLE_LABEL_A.to_string(), vec!["yoLo".to_string()])]);
    let (mut fetched, lock) = dstore.fetch_acquire(keys).await.unwrap();
    {
        let a_table = fetched.get_mut(UT_TABLE_LABEL_A).unwrap();
        let row = a_table.get_mut("yoLo").unwrap();
        row[0] = "have-eaten-yet".to_string();
    }
    let num = dstore.save_release(fetched, lock).unwrap();
    assert_eq!(num, 1);
    let keys = HashMap::from([(UT_TABLE_LABEL_A.to_string(), vec!["yoLo".to_string()])]);
    let fetched = dstore.fetch(keys).await.unwrap();
    let row = fetched.get(UT_TABLE_LABEL_A).unwrap().get("yoLo").unwrap();
    assert_eq!(row, &ut_row(&["have-eaten-yet", "59"]));
}

#[tokio::test]
async fn delete_ok() {
    let dstore = ut_dstore(10);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([
            ("Fiji".to_string(), ut_row(&["tee"])),
            ("Palau".to_string(), ut_row(&["shaw"])),
        ]),
    )]);
    let _num = dstore.save(data).await.unwrap();
    let info: AppInMemDeleteInfo =
        HashMap::from([(UT_TABLE_LABEL_A.to_string(), vec!["Palau".to_string()])]);
    let num = dstore.delete(info).await.unwrap();
    assert_eq!(num, 1);
    let keys = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        vec!["Palau".to_string(), "Fiji".to_string()],
    )]);
    let fetched = dstore.fetch(keys).await.unwrap();
    let a_table = fetched.get(UT_TABLE_LABEL_A).unwrap();
    assert!(a_table.get("Palau").is_none());
    assert!(a_table.get("Fiji").is_some());
}

#[tokio::test]
async fn access_nonexist_table() {
    let dstore = ut_dstore(10);
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([("G802".to_string(), ut_row(&["tee"]))]),
    )]);
    let result = dstore.save(data).await;
    let actual = result.unwrap_err();
    assert_eq!(actual.code, AppErrorCode::DataTableNotExist);
}

#[tokio::test]
async fn exceed_limit_error() {
    let dstore = ut_dstore(3);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([
            ("Taiwan".to_string(), ut_row(&["tee"])),
            ("Phillipine".to_string(), ut_row(&["sbitz"])),
            ("Malaysia".to_string(), ut_row(&["shaw"])),
        ]),
    )]);
    let result = dstore.save(data).await;
    assert!(result.is_ok());
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([("Gili".to_string(), ut_row(&["more"]))]),
    )]);
    let result = dstore.save(data).await;
    let actual = result.unwrap_err();
    assert_eq!(actual.code, AppErrorCode::ExceedingMaxLimit);
}

struct UtestDstoreFiltKeyOp {
    patt: String,
}

impl AbsDStoreFilterKeyOp for UtestDstoreFiltKeyOp {
    fn filter(&self, k: &String, _v: &Vec<String>) -> bool {
        k.contains(self.patt.as_str())
    }
}

#[tokio::test]
async fn filter_key_ok() {
    let dstore = ut_dstore(8);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    let search_id = "hemu";
    let data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([
            (format!("{search_id}-bisa"), ut_row(&["teehe"])),
            ("elf-schden".to_string(), ut_row(&["shaw"])),
            (format!("ferris-{search_id}"), ut_row(&["tito"])),
        ]),
    )]);
    let _num = dstore.save(data).await.unwrap();
    let op = UtestDstoreFiltKeyOp {
        patt: search_id.to_string(),
    };
    let actual_keys = dstore
        .filter_keys(UT_TABLE_LABEL_A.to_string(), &op)
        .await
        .unwrap();
    let actual_keys: HashSet<String, RandomState> = HashSet::from_iter(actual_keys);
    let expect_keys = HashSet::from_iter([
        format!("{search_id}-bisa"),
        format!("ferris-{search_id}"),
    ]);
    assert_eq!(actual_keys, expect_keys);
}
