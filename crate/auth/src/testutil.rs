//! Fixtures shared by the tests of this crate and of the server.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs1::DecodeRsaPrivateKey,
    pkcs1v15,
    sha2::Sha256,
    signature::{SignatureEncoding, Signer},
    traits::PublicKeyParts,
};
use serde_json::{Map, Value, json};

use crate::{
    base64url,
    events::{AuthEvent, AuthEvents},
    jwks::{SigningKey, SigningKeySet},
    key_source::KeySetSource,
    result::AuthResult,
};

pub const TEST_REGION: &str = "eu-west-3";
pub const TEST_POOL_ID: &str = "eu-west-3_Xy12AbCdE";
pub const TEST_CLIENT_ID: &str = "4f8s1dq2hsm0a0pq1clg3qrk7v";
pub const TEST_SUBJECT: &str = "6c3b7d9e-1f0a-4b8e-9d2c-7a5e3f1b0c44";

const SIGNING_KEY_1: &str = include_str!("../test_data/signing_key_1.pem");
const SIGNING_KEY_2: &str = include_str!("../test_data/signing_key_2.pem");

/// The issuer the provider stamps on tokens of the test pool.
#[must_use]
pub fn test_issuer() -> String {
    format!("https://cognito-idp.{TEST_REGION}.amazonaws.com/{TEST_POOL_ID}")
}

/// A fixed RSA key pair.
#[derive(Clone)]
pub struct TestKeyPair {
    private_key: RsaPrivateKey,
}

impl TestKeyPair {
    #[must_use]
    pub fn first() -> Self {
        Self::from_pem(SIGNING_KEY_1)
    }

    #[must_use]
    pub fn second() -> Self {
        Self::from_pem(SIGNING_KEY_2)
    }

    fn from_pem(pem: &str) -> Self {
        Self {
            private_key: RsaPrivateKey::from_pkcs1_pem(pem).expect("test key should parse"),
        }
    }

    #[must_use]
    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    /// The JWK the provider would publish for this key pair.
    #[must_use]
    pub fn jwk(&self, kid: &str) -> SigningKey {
        let public_key = self.public_key();
        SigningKey {
            kid: kid.to_owned(),
            kty: "RSA".to_owned(),
            alg: Some("RS256".to_owned()),
            key_use: Some("sig".to_owned()),
            n: Some(base64url::encode(&public_key.n().to_bytes_be())),
            e: Some(base64url::encode(&public_key.e().to_bytes_be())),
        }
    }
}

#[must_use]
pub fn sign_rs256(pair: &TestKeyPair, message: &[u8]) -> Vec<u8> {
    pkcs1v15::SigningKey::<Sha256>::new(pair.private_key.clone())
        .sign(message)
        .to_vec()
}

/// The claims of a valid ID token of the test pool, expiring in an hour.
#[must_use]
pub fn id_token_claims() -> Map<String, Value> {
    let now = Utc::now();
    let claims = json!({
        "sub": TEST_SUBJECT,
        "email_verified": true,
        "iss": test_issuer(),
        "cognito:username": TEST_SUBJECT,
        "aud": TEST_CLIENT_ID,
        "event_id": "0f0a9d6b-2bc1-4f43-9a0b-5c1e8a7d2f11",
        "token_use": "id",
        "auth_time": now.timestamp(),
        "exp": (now + Duration::hours(1)).timestamp(),
        "iat": now.timestamp(),
        "email": "jane.doe@example.com",
    });
    match claims {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Mint a compact JWS from a header and claims, signed RS256 with `pair`.
#[must_use]
pub fn mint_token(pair: &TestKeyPair, header: &Value, claims: &Map<String, Value>) -> String {
    let header = base64url::encode(&serde_json::to_vec(header).unwrap());
    let payload = base64url::encode(&serde_json::to_vec(claims).unwrap());
    let signing_input = format!("{header}.{payload}");
    let signature = base64url::encode(&sign_rs256(pair, signing_input.as_bytes()));
    format!("{signing_input}.{signature}")
}

/// Mint an ID token for `kid` with the standard test claims.
#[must_use]
pub fn mint_id_token(pair: &TestKeyPair, kid: &str) -> String {
    mint_token(
        pair,
        &json!({"kid": kid, "alg": "RS256"}),
        &id_token_claims(),
    )
}

/// A key source serving a fixed key set and counting how often it is asked.
#[derive(Debug, Default)]
pub struct StaticKeySetSource {
    key_set: SigningKeySet,
    fetches: AtomicUsize,
}

impl StaticKeySetSource {
    #[must_use]
    pub const fn new(key_set: SigningKeySet) -> Self {
        Self {
            key_set,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source publishing the first test key pair under `kid`.
    #[must_use]
    pub fn with_first_key(kid: &str) -> Self {
        Self::new(SigningKeySet::new(vec![TestKeyPair::first().jwk(kid)]))
    }

    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySetSource for StaticKeySetSource {
    async fn fetch_key_set(&self) -> AuthResult<Arc<SigningKeySet>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.key_set.clone()))
    }
}

/// Keeps every recorded event in memory.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<AuthEvent>>,
}

impl RecordingEvents {
    #[must_use]
    pub fn events(&self) -> Vec<AuthEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuthEvents for RecordingEvents {
    fn record(&self, event: AuthEvent) {
        self.events.lock().unwrap().push(event);
    }
}
