use std::env::temp_dir;
use std::fs::File;
use std::io::Write;

use ecommerce_common::config::{ApiServerCfg, AppCfgHardLimit, AppConfig};
use ecommerce_common::error::{AppCfgError, AppErrorCode};

fn ut_write_cfg_file(fname: &str, content: &str) -> String {
    let mut fullpath = temp_dir();
    fullpath.push(fname);
    let mut f = File::create(&fullpath).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    fullpath.to_str().unwrap().to_string()
}

fn ut_expect_err(
    result: Result<ApiServerCfg, AppCfgError>,
) -> AppCfgError {
    match result {
        Ok(_cfg) => panic!("expected config parse to fail"),
        Err(e) => e,
    }
}

fn ut_hard_limit() -> AppCfgHardLimit {
    AppCfgHardLimit {
        nitems_per_inmem_table: 2200,
        num_db_conns: 100,
        seconds_db_idle: 300,
    }
}

const UT_VALID_CFG: &str = r#"
{
    "logging": {
        "handlers": [
            {"alias": "console", "min_level": "WARNING", "destination": "console", "path": null}
        ],
        "loggers": [
            {"alias": "web", "handlers": ["console"], "level": "INFO"}
        ]
    },
    "listen": {
        "api_version": "api",
        "host": "localhost",
        "port": 8012,
        "max_connections": 64,
        "cors": "cors.json",
        "routes": [
            {"path": "/orders", "handler": "order_collection"}
        ]
    },
    "limit_req_body_in_bytes": 65536,
    "num_workers": 1,
    "stack_sz_kb": 128,
    "data_store": [
        {"_type": "InMemory", "alias": "utest", "max_items": 100}
    ],
    "auth": {
        "secret_path": "backoffice/jwt_secret",
        "admin_credential_path": "backoffice/admin_credential",
        "token_expiry_days": 7
    },
    "confidentiality": {"source": "UserSpace", "sys_path": "settings/secrets.json"}
}
"#;

#[test]
fn parse_ok() {
    let path = ut_write_cfg_file("ut_cfg_valid.json", UT_VALID_CFG);
    let result = AppConfig::parse_from_file(path, ut_hard_limit());
    let cfg = match result {
        Ok(c) => c,
        Err(e) => panic!("valid config rejected: {:?}", e),
    };
    assert_eq!(cfg.listen.port, 8012);
    assert_eq!(cfg.listen.routes.len(), 1);
    assert_eq!(cfg.auth.token_expiry_days, 7);
    assert!(cfg.mail_gateway.is_none());
}

#[test]
fn parse_missing_routes() {
    let broken = UT_VALID_CFG.replace(
        r#""routes": [
            {"path": "/orders", "handler": "order_collection"}
        ]"#,
        r#""routes": []"#,
    );
    let path = ut_write_cfg_file("ut_cfg_no_routes.json", broken.as_str());
    let e = ut_expect_err(AppConfig::parse_from_file(path, ut_hard_limit()));
    assert_eq!(e.code, AppErrorCode::NoRouteApiServerCfg);
}

#[test]
fn parse_bad_version_segment() {
    let broken = UT_VALID_CFG.replace(
        r#""api_version": "api""#,
        r#""api_version": "api/v2""#,
    );
    let path = ut_write_cfg_file("ut_cfg_bad_version.json", broken.as_str());
    let e = ut_expect_err(AppConfig::parse_from_file(path, ut_hard_limit()));
    assert_eq!(e.code, AppErrorCode::InvalidVersion);
}

#[test]
fn parse_logger_with_unknown_handler() {
    let broken = UT_VALID_CFG.replace(
        r#""handlers": ["console"]"#,
        r#""handlers": ["no-such-handler"]"#,
    );
    let path = ut_write_cfg_file("ut_cfg_bad_logger.json", broken.as_str());
    let e = ut_expect_err(AppConfig::parse_from_file(path, ut_hard_limit()));
    assert_eq!(e.code, AppErrorCode::InvalidHandlerLoggerCfg);
}

#[test]
fn parse_inmem_limit_exceeded() {
    let broken = UT_VALID_CFG.replace(r#""max_items": 100"#, r#""max_items": 90000"#);
    let path = ut_write_cfg_file("ut_cfg_inmem_limit.json", broken.as_str());
    let e = ut_expect_err(AppConfig::parse_from_file(path, ut_hard_limit()));
    assert_eq!(e.code, AppErrorCode::ExceedingMaxLimit);
}

#[test]
fn parse_file_not_found() {
    let result = AppConfig::parse_from_file("/no/such/file.json".to_string(), ut_hard_limit());
    let e = ut_expect_err(result);
    assert!(matches!(e.code, AppErrorCode::IOerror(_)));
}
