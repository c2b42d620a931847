use std::boxed::Box;
use std::io::ErrorKind;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::client::conn as ClientConn;
use hyper::{header, Body as HyperBody, Method, Request};
use tokio::net::TcpStream;
use tokio_native_tls::TlsConnector;

use ecommerce_common::config::AppMailGatewayCfg;
use ecommerce_common::constant::HTTP_CONTENT_TYPE_JSON;
use ecommerce_common::error::AppErrorCode;
use ecommerce_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::confidentiality::AbstractConfidentiality;
use crate::error::AppError;

// outbound notification dispatch is fire-and-forget across the whole
// application, callers log a failed submission and move on, the order
// record itself stays the source of truth (never the notification)
#[async_trait]
pub trait AbstractMailGateway: Send + Sync {
    async fn submit(&self, serial_body: Vec<u8>) -> DefaultResult<(), AppError>;
}

pub(crate) fn build_context(
    cfg: Option<&AppMailGatewayCfg>,
    logctx: Arc<AppLogContext>,
    confidential: Arc<Box<dyn AbstractConfidentiality>>,
) -> DefaultResult<Box<dyn AbstractMailGateway>, AppError> {
    match cfg {
        Some(c) => {
            let auth_token = if let Some(path) = c.confidential_path.as_ref() {
                Some(confidential.try_get_payload(path.as_str())?)
            } else {
                None
            };
            let obj = AppMailGatewayClient::new(c, auth_token, logctx);
            Ok(Box::new(obj))
        }
        None => Ok(Box::new(AppDummyMailGateway { logctx })),
    }
}

pub struct AppMailGatewayClient {
    host: String,
    port: u16,
    secure: bool,
    resource_path: String,
    auth_token: Option<String>,
    logctx: Arc<AppLogContext>,
}

// applied when no gateway is configured, e.g. in development environment
// or test code, submissions are logged then discarded
pub struct AppDummyMailGateway {
    pub logctx: Arc<AppLogContext>,
}

impl AppMailGatewayClient {
    fn new(cfg: &AppMailGatewayCfg, auth_token: Option<String>, logctx: Arc<AppLogContext>) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            secure: cfg.secure,
            resource_path: cfg.resource_path.clone(),
            auth_token,
            logctx,
        }
    }

    // one short-lived connection per submission, the gateway is contacted a
    // few times per order at most
    async fn setup_connection(
        &self,
    ) -> DefaultResult<ClientConn::SendRequest<HyperBody>, AppError> {
        let addr = format!("{}:{}", self.host.as_str(), self.port);
        let tcp_stream = TcpStream::connect(addr).await.map_err(|e| AppError {
            code: AppErrorCode::IOerror(e.kind()),
            detail: Some(e.to_string()),
        })?;
        let logctx_p = self.logctx.clone();
        let sender = if self.secure {
            let inner_tls = tokio_native_tls::native_tls::TlsConnector::builder()
                .build()
                .map_err(|e| AppError {
                    code: AppErrorCode::CryptoFailure,
                    detail: Some(e.to_string()),
                })?;
            let connector = TlsConnector::from(inner_tls);
            let tls_stream = connector
                .connect(self.host.as_str(), tcp_stream)
                .await
                .map_err(|e| AppError {
                    code: AppErrorCode::CryptoFailure,
                    detail: Some(e.to_string()),
                })?;
            let (sender, connection) =
                ClientConn::handshake(tls_stream)
                    .await
                    .map_err(|e| AppError {
                        code: hyper_err_to_apperrcode(&e),
                        detail: Some(e.to_string()),
                    })?;
            let _handle = tokio::task::spawn(async move {
                if let Err(e) = connection.await {
                    app_log_event!(logctx_p, AppLogLevel::WARNING, "mail-gw-conn: {e}");
                }
            });
            sender
        } else {
            let (sender, connection) =
                ClientConn::handshake(tcp_stream)
                    .await
                    .map_err(|e| AppError {
                        code: hyper_err_to_apperrcode(&e),
                        detail: Some(e.to_string()),
                    })?;
            let _handle = tokio::task::spawn(async move {
                if let Err(e) = connection.await {
                    app_log_event!(logctx_p, AppLogLevel::WARNING, "mail-gw-conn: {e}");
                }
            });
            sender
        };
        Ok(sender)
    } // end of fn setup_connection
} // end of impl AppMailGatewayClient

#[async_trait]
impl AbstractMailGateway for AppMailGatewayClient {
    async fn submit(&self, serial_body: Vec<u8>) -> DefaultResult<(), AppError> {
        let mut sender = self.setup_connection().await?;
        let mut builder = Request::builder()
            .uri(self.resource_path.as_str())
            .method(Method::POST)
            .header(header::HOST, self.host.as_str())
            .header(header::CONTENT_TYPE, HTTP_CONTENT_TYPE_JSON);
        if let Some(tok) = self.auth_token.as_ref() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {tok}"));
        }
        let req = builder
            .body(HyperBody::from(serial_body))
            .map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?;
        let resp = sender.send_request(req).await.map_err(|e| AppError {
            code: hyper_err_to_apperrcode(&e),
            detail: Some(e.to_string()),
        })?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let detail = format!("mail-gateway-resp-status:{}", resp.status());
            Err(AppError {
                code: AppErrorCode::IOerror(ErrorKind::ConnectionRefused),
                detail: Some(detail),
            })
        }
    } // end of fn submit
} // end of impl AbstractMailGateway for AppMailGatewayClient

#[async_trait]
impl AbstractMailGateway for AppDummyMailGateway {
    async fn submit(&self, serial_body: Vec<u8>) -> DefaultResult<(), AppError> {
        let logctx_p = &self.logctx;
        app_log_event!(
            logctx_p,
            AppLogLevel::INFO,
            "mail gateway disabled, dropped {} bytes",
            serial_body.len()
        );
        Ok(())
    }
}

fn hyper_err_to_apperrcode(value: &hyper::Error) -> AppErrorCode {
    if value.is_connect() {
        AppErrorCode::IOerror(ErrorKind::NotConnected)
    } else if value.is_parse() || value.is_incomplete_message() {
        AppErrorCode::DataCorruption
    } else if value.is_parse_too_large() {
        AppErrorCode::ExceedingMaxLimit
    } else if value.is_user() {
        AppErrorCode::IOerror(ErrorKind::InvalidInput)
    } else if value.is_timeout() {
        AppErrorCode::IOerror(ErrorKind::TimedOut)
    } else if value.is_canceled() {
        AppErrorCode::IOerror(ErrorKind::Interrupted)
    } else {
        AppErrorCode::IOerror(ErrorKind::Other)
    }
}
