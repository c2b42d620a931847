mod adapter;
mod auth;
pub(crate) mod model;
mod repository;
mod usecase;

use std::boxed::Box;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use ecommerce_common::config::{
    AppBasepathCfg, AppInMemoryDbCfg, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg,
};
use ecommerce_common::constant::logging::{Destination, Level};
use ecommerce_common::logging::AppLogContext;

use storefront::datastore::{AbstInMemoryDStore, AppInMemoryDStore};

pub(crate) fn ut_setup_dstore(max_items: u32) -> Arc<Box<dyn AbstInMemoryDStore>> {
    let cfg = AppInMemoryDbCfg {
        alias: "utest".to_string(),
        max_items,
    };
    let obj: Box<dyn AbstInMemoryDStore> = Box::new(AppInMemoryDStore::new(&cfg));
    Arc::new(obj)
}

pub(crate) fn ut_log_context() -> Arc<AppLogContext> {
    let cfg = AppLoggingCfg {
        handlers: vec![AppLogHandlerCfg {
            min_level: Level::FATAL,
            destination: Destination::CONSOLE,
            alias: Arc::new("console".to_string()),
            path: None,
        }],
        loggers: vec![AppLoggerCfg {
            alias: Arc::new("utest".to_string()),
            handlers: vec!["console".to_string()],
            level: None,
        }],
    };
    let basepath = AppBasepathCfg {
        system: ".".to_string(),
        service: ".".to_string(),
    };
    Arc::new(AppLogContext::new(&basepath, &cfg))
}

pub(crate) fn ut_time(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap()
}
