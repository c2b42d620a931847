use std::result::Result as DefaultResult;

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey};

use storefront::{
    issue_token, verify_token, AbstractAuthKeystore, AppAuthRole, AppAuthedClaim,
};

use crate::ut_time;

struct MockAuthKeystore {
    enc_key: EncodingKey,
    dec_key: DecodingKey,
    lifetime: Duration,
}

impl MockAuthKeystore {
    fn build(secret: &str, lifetime_days: i64) -> Self {
        Self {
            enc_key: EncodingKey::from_secret(secret.as_bytes()),
            dec_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::days(lifetime_days),
        }
    }
}

impl AbstractAuthKeystore for MockAuthKeystore {
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

fn issue_for(
    ks: &MockAuthKeystore,
    profile: &str,
    role: AppAuthRole,
) -> DefaultResult<String, storefront::error::AppError> {
    let now = chrono::Local::now().fixed_offset();
    let claim = AppAuthedClaim::build(profile.to_string(), role, now, ks.token_lifetime());
    issue_token(&claim, ks)
}

#[test]
fn token_roundtrip_partner() {
    let ks = MockAuthKeystore::build("unit-test-secret", 7);
    let token = issue_for(&ks, "p-beef0001", AppAuthRole::Partner).unwrap();
    let decoded = verify_token(token.as_str(), &ks).unwrap();
    assert_eq!(decoded.profile.as_str(), "p-beef0001");
    assert!(!decoded.is_admin());
    assert_eq!(decoded.partner_id(), Some("p-beef0001"));
    assert!(decoded.aud.contains(&"storefront".to_string()));
    assert_eq!(decoded.exp - decoded.iat, 7 * 86400);
}

#[test]
fn token_roundtrip_admin() {
    let ks = MockAuthKeystore::build("unit-test-secret", 7);
    let token = issue_for(&ks, "admin", AppAuthRole::Admin).unwrap();
    let decoded = verify_token(token.as_str(), &ks).unwrap();
    assert!(decoded.is_admin());
    assert!(decoded.partner_id().is_none());
}

#[test]
fn token_wrong_secret_rejected() {
    let ks = MockAuthKeystore::build("unit-test-secret", 7);
    let other = MockAuthKeystore::build("different-secret", 7);
    let token = issue_for(&ks, "p-beef0001", AppAuthRole::Partner).unwrap();
    let result = verify_token(token.as_str(), &other);
    assert!(result.is_err());
}

#[test]
fn token_expired_rejected() {
    let ks = MockAuthKeystore::build("unit-test-secret", 7);
    let issued = ut_time("2020-01-01T00:00:00+00:00");
    let claim = AppAuthedClaim::build(
        "p-beef0001".to_string(),
        AppAuthRole::Partner,
        issued,
        ks.token_lifetime(),
    );
    let token = issue_token(&claim, &ks).unwrap();
    let result = verify_token(token.as_str(), &ks);
    assert!(result.is_err());
}

#[test]
fn token_garbage_rejected() {
    let ks = MockAuthKeystore::build("unit-test-secret", 7);
    assert!(verify_token("not-a-jwt-at-all", &ks).is_err());
}
