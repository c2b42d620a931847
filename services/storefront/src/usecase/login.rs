use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use ecommerce_common::error::AppErrorCode;

use crate::api::web::dto::{
    AdminLoginReqDto, AdminLoginRespDto, PartnerLoginReqDto, PartnerLoginRespDto,
    PartnerSummaryDto,
};
use crate::auth::{issue_token, AbstractAuthKeystore, AppAdminCredential, AppAuthRole, AppAuthedClaim};
use crate::confidentiality::AbstractConfidentiality;
use crate::error::AppError;
use crate::repository::AbsPartnerRepo;

pub enum LoginUcError {
    // deliberately a single variant for unknown email and wrong password,
    // the response must not reveal which one failed
    BadCredential,
    AccessDisabled,
    Suspended,
    PasswordNotSet,
    Server(AppError),
}

pub struct PartnerLoginUseCase {
    pub repo: Box<dyn AbsPartnerRepo>,
    pub keystore: Arc<Box<dyn AbstractAuthKeystore>>,
}

impl PartnerLoginUseCase {
    pub async fn execute(
        self,
        data: PartnerLoginReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<PartnerLoginRespDto, LoginUcError> {
        if data.email.trim().is_empty() || data.password.is_empty() {
            return Err(LoginUcError::BadCredential);
        }
        let partner = self
            .repo
            .fetch_by_email(data.email.as_str())
            .await
            .map_err(LoginUcError::Server)?
            .ok_or(LoginUcError::BadCredential)?;
        if !partner.has_access {
            return Err(LoginUcError::AccessDisabled);
        }
        if !partner.is_active {
            return Err(LoginUcError::Suspended);
        }
        if partner.password_hash.is_none() {
            return Err(LoginUcError::PasswordNotSet);
        }
        let matched = partner
            .verify_password(data.password.as_str())
            .map_err(LoginUcError::Server)?;
        if !matched {
            return Err(LoginUcError::BadCredential);
        }
        self.repo
            .record_login(partner.id.as_str(), now)
            .await
            .map_err(LoginUcError::Server)?;
        let claim = AppAuthedClaim::build(
            partner.id.clone(),
            AppAuthRole::Partner,
            now,
            self.keystore.token_lifetime(),
        );
        let token =
            issue_token(&claim, self.keystore.as_ref().as_ref()).map_err(LoginUcError::Server)?;
        Ok(PartnerLoginRespDto {
            token,
            partner: PartnerSummaryDto::from(&partner),
        })
    } // end of fn execute
} // end of impl PartnerLoginUseCase

pub struct AdminLoginUseCase {
    pub confidential: Arc<Box<dyn AbstractConfidentiality>>,
    pub keystore: Arc<Box<dyn AbstractAuthKeystore>>,
    pub credential_path: String,
}

impl AdminLoginUseCase {
    pub async fn execute(
        self,
        data: AdminLoginReqDto,
        now: DateTime<FixedOffset>,
    ) -> DefaultResult<AdminLoginRespDto, LoginUcError> {
        let serial = self
            .confidential
            .try_get_payload(self.credential_path.as_str())
            .map_err(LoginUcError::Server)?;
        let cred = serde_json::from_str::<AppAdminCredential>(serial.as_str()).map_err(|e| {
            LoginUcError::Server(AppError {
                code: AppErrorCode::InvalidJsonFormat,
                detail: Some(e.to_string()),
            })
        })?;
        let matched = cred
            .verify(data.username.as_str(), data.password.as_str())
            .map_err(LoginUcError::Server)?;
        if !matched {
            return Err(LoginUcError::BadCredential);
        }
        let claim = AppAuthedClaim::build(
            cred.username.clone(),
            AppAuthRole::Admin,
            now,
            self.keystore.token_lifetime(),
        );
        let token =
            issue_token(&claim, self.keystore.as_ref().as_ref()).map_err(LoginUcError::Server)?;
        let name = cred.display_name.unwrap_or(cred.username);
        Ok(AdminLoginRespDto { token, name })
    } // end of fn execute
} // end of impl AdminLoginUseCase
