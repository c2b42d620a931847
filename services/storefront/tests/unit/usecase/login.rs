use std::boxed::Box;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey};

use storefront::api::web::dto::PartnerLoginReqDto;
use storefront::datastore::AbstInMemoryDStore;
use storefront::repository::{AbsPartnerRepo, PartnerInMemRepo};
use storefront::usecase::{LoginUcError, PartnerLoginUseCase};
use storefront::{verify_token, AbstractAuthKeystore};

use crate::model::{ut_default_partner, ut_now};
use crate::ut_setup_dstore;

struct UtAuthKeystore {
    enc_key: EncodingKey,
    dec_key: DecodingKey,
}

impl UtAuthKeystore {
    fn build() -> Arc<Box<dyn AbstractAuthKeystore>> {
        let secret = "login-unit-test-secret";
        let obj: Box<dyn AbstractAuthKeystore> = Box::new(Self {
            enc_key: EncodingKey::from_secret(secret.as_bytes()),
            dec_key: DecodingKey::from_secret(secret.as_bytes()),
        });
        Arc::new(obj)
    }
}

impl AbstractAuthKeystore for UtAuthKeystore {
    fn encoding_key(&self) -> &EncodingKey {
        &self.enc_key
    }
    fn decoding_key(&self) -> &DecodingKey {
        &self.dec_key
    }
    fn token_lifetime(&self) -> Duration {
        Duration::days(7)
    }
}

async fn ut_seed_partner(
    ds: Arc<Box<dyn AbstInMemoryDStore>>,
    has_access: bool,
    is_active: bool,
    password: Option<&str>,
) {
    let repo = PartnerInMemRepo::new(ds).await.unwrap();
    let mut p = ut_default_partner(ut_now());
    p.has_access = has_access;
    p.is_active = is_active;
    if let Some(plain) = password {
        p.assign_password(plain).unwrap();
    }
    repo.create(p).await.unwrap();
}

fn ut_req(email: &str, password: &str) -> PartnerLoginReqDto {
    PartnerLoginReqDto {
        email: email.to_string(),
        password: password.to_string(),
    }
}

async fn ut_usecase(ds: Arc<Box<dyn AbstInMemoryDStore>>) -> PartnerLoginUseCase {
    PartnerLoginUseCase {
        repo: Box::new(PartnerInMemRepo::new(ds).await.unwrap()),
        keystore: UtAuthKeystore::build(),
    }
}

#[tokio::test]
async fn login_success_issues_token() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), true, true, Some("s3cret-enough")).await;
    let uc = ut_usecase(ds.clone()).await;
    let now = chrono::Local::now().fixed_offset();
    let resp = uc
        .execute(ut_req("Contact@GreenValley.example", "s3cret-enough"), now)
        .await
        .ok()
        .unwrap();
    assert_eq!(resp.partner.partner_code.as_str(), "GREENV");

    let ks = UtAuthKeystore::build();
    let claim = verify_token(resp.token.as_str(), ks.as_ref().as_ref()).unwrap();
    assert_eq!(claim.partner_id(), Some("p-beef0001"));
    assert!(!claim.is_admin());

    // login tracking moved
    let repo = PartnerInMemRepo::new(ds).await.unwrap();
    let p = repo.fetch("p-beef0001").await.unwrap().unwrap();
    assert_eq!(p.login_count, 1);
    assert!(p.last_login_at.is_some());
}

#[tokio::test]
async fn login_wrong_password() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), true, true, Some("s3cret-enough")).await;
    let uc = ut_usecase(ds.clone()).await;
    let result = uc
        .execute(
            ut_req("contact@greenvalley.example", "guess-again"),
            ut_now(),
        )
        .await;
    assert!(matches!(result, Err(LoginUcError::BadCredential)));
    let repo = PartnerInMemRepo::new(ds).await.unwrap();
    let p = repo.fetch("p-beef0001").await.unwrap().unwrap();
    assert_eq!(p.login_count, 0);
}

#[tokio::test]
async fn login_unknown_email() {
    let ds = ut_setup_dstore(64);
    let uc = ut_usecase(ds).await;
    let result = uc
        .execute(ut_req("nobody@example.com", "whatever"), ut_now())
        .await;
    assert!(matches!(result, Err(LoginUcError::BadCredential)));
}

#[tokio::test]
async fn login_access_gate_before_suspension() {
    let ds = ut_setup_dstore(64);
    // both gates closed, the access gate answers first
    ut_seed_partner(ds.clone(), false, false, Some("s3cret-enough")).await;
    let uc = ut_usecase(ds).await;
    let result = uc
        .execute(
            ut_req("contact@greenvalley.example", "s3cret-enough"),
            ut_now(),
        )
        .await;
    assert!(matches!(result, Err(LoginUcError::AccessDisabled)));
}

#[tokio::test]
async fn login_suspended_account() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), true, false, Some("s3cret-enough")).await;
    let uc = ut_usecase(ds).await;
    let result = uc
        .execute(
            ut_req("contact@greenvalley.example", "s3cret-enough"),
            ut_now(),
        )
        .await;
    assert!(matches!(result, Err(LoginUcError::Suspended)));
}

#[tokio::test]
async fn login_password_never_set() {
    let ds = ut_setup_dstore(64);
    ut_seed_partner(ds.clone(), true, true, None).await;
    let uc = ut_usecase(ds).await;
    let result = uc
        .execute(
            ut_req("contact@greenvalley.example", "s3cret-enough"),
            ut_now(),
        )
        .await;
    assert!(matches!(result, Err(LoginUcError::PasswordNotSet)));
}
