use std::result::Result as DefaultResult;
use std::sync::Arc;

use uuid::{Builder, NoContext, Timestamp, Uuid};

pub mod api;
pub mod constant;
pub mod error;
pub mod model;
pub mod network;
pub mod repository;
pub mod usecase;

pub mod confidentiality;

mod auth;
pub use auth::{
    issue_token, verify_token, AbstractAuthKeystore, AppAdminCredential, AppAuthKeystore,
    AppAuthRole, AppAuthedClaim,
};

mod adapter;
pub use adapter::datastore;
pub use adapter::{AbstractMailGateway, AppDummyMailGateway, AppMailGatewayClient};

pub use ecommerce_common::config::{
    AppBasepathCfg, AppCfgHardLimit, AppCfgInitArgs, AppConfig,
};

use confidentiality::AbstractConfidentiality;
use ecommerce_common::logging::AppLogContext;
use error::AppError;

type WebApiHdlrLabel = &'static str;

pub struct AppDataStoreContext {
    pub in_mem: Option<Arc<Box<dyn datastore::AbstInMemoryDStore>>>,
    pub sql_dbs: Option<Vec<Arc<datastore::AppMariaDbStore>>>,
}

// global state shared by all worker threads
pub struct AppSharedState {
    _cfg: Arc<AppConfig>,
    _log: Arc<AppLogContext>,
    dstore: Arc<AppDataStoreContext>,
    _auth_keys: Arc<Box<dyn AbstractAuthKeystore>>,
    _mailer: Arc<Box<dyn AbstractMailGateway>>,
    _confidential: Arc<Box<dyn AbstractConfidentiality>>,
}

impl AppSharedState {
    pub fn new(
        cfg: AppConfig,
        log: AppLogContext,
        confidential: Box<dyn AbstractConfidentiality>,
    ) -> DefaultResult<Self, AppError> {
        let confidential = Arc::new(confidential);
        let log = Arc::new(log);
        let (in_mem, sql_dbs) = datastore::build_context(
            log.clone(),
            &cfg.api_server.data_store,
            confidential.clone(),
        );
        let in_mem = in_mem.map(Arc::new);
        let sql_dbs = sql_dbs.map(|m| m.into_iter().map(Arc::new).collect());
        let ds_ctx = Arc::new(AppDataStoreContext { in_mem, sql_dbs });
        let auth_keys = AppAuthKeystore::try_build(
            &cfg.api_server.auth,
            confidential.as_ref().as_ref(),
        )?;
        let mailer = adapter::mail_gateway::build_context(
            cfg.api_server.mail_gateway.as_ref(),
            log.clone(),
            confidential.clone(),
        )?;
        Ok(Self {
            _cfg: Arc::new(cfg),
            _log: log,
            dstore: ds_ctx,
            _auth_keys: Arc::new(Box::new(auth_keys)),
            _mailer: Arc::new(mailer),
            _confidential: confidential,
        })
    } // end of fn new

    pub fn config(&self) -> &Arc<AppConfig> {
        &self._cfg
    }

    pub fn log_context(&self) -> &Arc<AppLogContext> {
        &self._log
    }

    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self.dstore.clone()
    }

    pub fn auth_keystore(&self) -> Arc<Box<dyn AbstractAuthKeystore>> {
        self._auth_keys.clone()
    }

    pub fn mail_gateway(&self) -> Arc<Box<dyn AbstractMailGateway>> {
        self._mailer.clone()
    }

    pub fn confidentiality(&self) -> Arc<Box<dyn AbstractConfidentiality>> {
        self._confidential.clone()
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _cfg: self._cfg.clone(),
            _log: self._log.clone(),
            dstore: self.dstore.clone(),
            _auth_keys: self._auth_keys.clone(),
            _mailer: self._mailer.clone(),
            _confidential: self._confidential.clone(),
        }
    }
}

fn generate_custom_uid(machine_code: u8) -> Uuid {
    // UUIDv7 is for single-node application. This app needs to consider
    // scalability of multi-node environment, UUIDv8 can be utilized cuz it
    // allows custom ID layout, so few bits of the ID can be assigned to
    // represent each machine/node ID,  rest of that should be timestamp with
    // random byte sequence
    let ts_ctx = NoContext;
    let (secs, nano) = Timestamp::now(ts_ctx).to_unix();
    let millis = (secs * 1000).saturating_add((nano as u64) / 1_000_000);
    let mut node_id = rand::random::<[u8; 10]>();
    node_id[0] = machine_code;
    let builder = Builder::from_unix_timestamp_millis(millis, &node_id);
    builder.into_uuid()
}

/// document ids for partners, coupons, payout requests and products
pub fn generate_doc_id() -> String {
    generate_custom_uid(constant::app_meta::MACHINE_CODE)
        .simple()
        .to_string()
}
