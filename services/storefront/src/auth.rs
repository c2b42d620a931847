use std::result::Result as DefaultResult;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header as HttpHeader, StatusCode as HttpStatusCode};
use chrono::{DateTime, Duration, FixedOffset};
use jsonwebtoken::{
    decode as jwt_decode, encode as jwt_encode, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};

use ecommerce_common::config::AppAuthCfg;
use ecommerce_common::error::AppErrorCode;

use crate::constant::app_meta;
use crate::error::AppError;
use crate::AppSharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppAuthRole {
    Admin,
    Partner,
}

// the storefront verifies a shared-secret HS256 token, `profile` carries
// the partner document id, or the admin account label for back-office
// logins
#[derive(Serialize, Deserialize, Clone)]
pub struct AppAuthedClaim {
    pub profile: String,
    pub role: AppAuthRole,
    pub aud: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl AppAuthedClaim {
    pub fn build(
        profile: String,
        role: AppAuthRole,
        now: DateTime<FixedOffset>,
        lifetime: Duration,
    ) -> Self {
        let issued = now.timestamp();
        Self {
            profile,
            role,
            aud: vec![app_meta::LABEL.to_string()],
            iat: issued,
            exp: issued + lifetime.num_seconds(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, AppAuthRole::Admin)
    }

    pub fn partner_id(&self) -> Option<&str> {
        match self.role {
            AppAuthRole::Partner => Some(self.profile.as_str()),
            AppAuthRole::Admin => None,
        }
    }
}

pub trait AbstractAuthKeystore: Send + Sync {
    fn encoding_key(&self) -> &EncodingKey;
    fn decoding_key(&self) -> &DecodingKey;
    fn token_lifetime(&self) -> Duration;
}

pub struct AppAuthKeystore {
    enc_key: EncodingKey,
    dec_key: DecodingKey,
    lifetime: Duration,
}

impl AppAuthKeystore {
    pub fn try_build(
        cfg: &AppAuthCfg,
        confidential: &dyn crate::confidentiality::AbstractConfidentiality,
    ) -> DefaultResult<Self, AppError> {
        let secret = confidential.try_get_payload(cfg.secret_path.as_str())?;
        if secret.is_empty() {
            return Err(AppError {
                code: AppErrorCode::MissingSecretPath,
                detail: Some(cfg.secret_path.clone()),
            });
        }
        Ok(Self {
            enc_key: EncodingKey::from_secret(secret.as_bytes()),
            dec_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::days(cfg.token_expiry_days as i64),
        })
    }
}

impl AbstractAuthKeystore for AppAuthKeystore {
    fn encoding_key(&self) -> &EncodingKey {
        &self.enc_key
    }
    fn decoding_key(&self) -> &DecodingKey {
        &self.dec_key
    }
    fn token_lifetime(&self) -> Duration {
        self.lifetime
    }
}

pub fn issue_token(
    claim: &AppAuthedClaim,
    keystore: &dyn AbstractAuthKeystore,
) -> DefaultResult<String, AppError> {
    let header = Header::new(Algorithm::HS256);
    jwt_encode(&header, claim, keystore.encoding_key()).map_err(|e| AppError {
        code: AppErrorCode::CryptoFailure,
        detail: Some(e.to_string()),
    })
}

pub fn verify_token(
    raw: &str,
    keystore: &dyn AbstractAuthKeystore,
) -> DefaultResult<AppAuthedClaim, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[app_meta::LABEL]);
    jwt_decode::<AppAuthedClaim>(raw, keystore.decoding_key(), &validation)
        .map(|d| d.claims)
        .map_err(|e| AppError {
            code: AppErrorCode::PermissionDenied,
            detail: Some(e.to_string()),
        })
}

// body shape matches the regular response envelope
fn unauthorized_rejection() -> (HttpStatusCode, String) {
    (
        HttpStatusCode::UNAUTHORIZED,
        r#"{"success":false,"error":"Unauthorized"}"#.to_string(),
    )
}

#[async_trait]
impl FromRequestParts<AppSharedState> for AppAuthedClaim {
    type Rejection = (HttpStatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppSharedState,
    ) -> DefaultResult<Self, Self::Rejection> {
        let hdr_value = parts
            .headers
            .get(HttpHeader::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unauthorized_rejection)?;
        let token = hdr_value
            .strip_prefix("Bearer ")
            .ok_or_else(unauthorized_rejection)?;
        let keystore = state.auth_keystore();
        verify_token(token, keystore.as_ref().as_ref()).map_err(|_e| unauthorized_rejection())
    }
}

// back-office credential kept in the confidentiality store, the password
// is a bcrypt hash, never plaintext
#[derive(Deserialize)]
pub struct AppAdminCredential {
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

impl AppAdminCredential {
    pub fn verify(&self, username: &str, password: &str) -> DefaultResult<bool, AppError> {
        if self.username.as_str() != username {
            return Ok(false);
        }
        bcrypt::verify(password, self.password_hash.as_str()).map_err(|e| AppError {
            code: AppErrorCode::CryptoFailure,
            detail: Some(e.to_string()),
        })
    }
}
