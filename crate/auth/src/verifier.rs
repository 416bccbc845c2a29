//! ID token verification.
//!
//! A token is accepted only once all of the following hold, checked in this order:
//!  1. it is a well formed compact JWS whose header names a key (a non-empty `kid`)
//!  2. the provider publishes a key under that `kid`
//!  3. the key converts to an RSA public key; any conversion failure, including a
//!     non-RSA key type, is reported as invalid key material
//!  4. the header announces RS256 and the signature verifies against that key
//!  5. the claims are current (`exp`, then `nbf`) and were issued for this client (`aud`)
//!     by this pool (`iss`), as an ID token (`token_use`)
//!
//! The first failing step decides the reported reason.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::{
    auth_ensure,
    claims::TokenClaims,
    error::{AuthError, TokenValidationError},
    events::{AuthEvent, SharedEvents},
    key_material::to_public_key,
    key_source::{CognitoPool, KeySetSource, find_by_key_id},
    result::AuthResult,
    token::UnverifiedToken,
};

const RS256: &str = "RS256";
const ID_TOKEN_USE: &str = "id";

pub struct TokenVerifier {
    keys: Arc<dyn KeySetSource>,
    issuer: String,
    audience: String,
    leeway: Duration,
    events: SharedEvents,
}

impl TokenVerifier {
    /// A verifier accepting ID tokens of `pool` issued for the app client `client_id`.
    #[must_use]
    pub fn new(
        pool: &CognitoPool,
        client_id: &str,
        keys: Arc<dyn KeySetSource>,
        events: SharedEvents,
    ) -> Self {
        Self {
            keys,
            issuer: pool.issuer(),
            audience: client_id.to_owned(),
            leeway: Duration::zero(),
            events,
        }
    }

    /// Tolerate this much clock skew on `exp` and `nbf`. None by default.
    #[must_use]
    pub const fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub async fn verify(&self, token: &str) -> Result<TokenClaims, TokenValidationError> {
        self.verify_at(token, Utc::now()).await
    }

    /// Verify `token` as if the current time were `now`.
    pub async fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenValidationError> {
        match self.check(token, now).await {
            Ok(claims) => {
                self.events.record(AuthEvent::TokenVerified {
                    subject: claims.subject().map(str::to_owned),
                });
                Ok(claims)
            }
            Err(e) => {
                self.events.record(AuthEvent::TokenRejected {
                    reason: e.reason(),
                    detail: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    async fn check(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        let token = UnverifiedToken::parse(token)?;
        let kid = token
            .header
            .kid
            .as_deref()
            .filter(|kid| !kid.is_empty())
            .ok_or(AuthError::MissingKeyId)?;

        let jwk = find_by_key_id(self.keys.as_ref(), kid, self.events.as_ref())
            .await?
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_owned()))?;
        let public_key = to_public_key(&jwk).map_err(|e| match e {
            AuthError::UnsupportedKeyType(_) => AuthError::InvalidKeyMaterial(e.to_string()),
            e => e,
        })?;

        auth_ensure!(
            token.header.alg.as_deref() == Some(RS256),
            AuthError::InvalidSignature
        );
        public_key.verify_rs256(token.signing_input.as_bytes(), &token.signature)?;

        let claims = serde_json::from_slice::<TokenClaims>(&token.payload)
            .map_err(|e| AuthError::MalformedToken(format!("invalid claims: {e}")))?;
        self.check_claims(&claims, now)?;
        Ok(claims)
    }

    fn check_claims(&self, claims: &TokenClaims, now: DateTime<Utc>) -> AuthResult<()> {
        let now = seconds(now.timestamp_millis());
        let leeway = seconds(self.leeway.num_milliseconds());

        // missing or non-numeric `exp` counts as expired
        let exp = claims.expires_at().ok_or(AuthError::Expired)?;
        auth_ensure!(now < exp + leeway, AuthError::Expired);
        if let Some(nbf) = claims.not_before() {
            auth_ensure!(now >= nbf - leeway, AuthError::NotYetValid);
        }
        auth_ensure!(
            claims
                .audience()
                .is_some_and(|aud| aud.contains(&self.audience)),
            AuthError::InvalidAudience(self.audience.clone())
        );
        auth_ensure!(
            claims.issuer() == Some(self.issuer.as_str()),
            AuthError::InvalidIssuer(self.issuer.clone())
        );
        match claims.get("token_use") {
            Some(Value::String(token_use)) if token_use == ID_TOKEN_USE => Ok(()),
            Some(Value::String(token_use)) => Err(AuthError::WrongTokenClass(token_use.clone())),
            Some(other) => Err(AuthError::WrongTokenClass(other.to_string())),
            None => Err(AuthError::WrongTokenClass(String::new())),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn seconds(millis: i64) -> f64 {
    millis as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{Map, Value, json};

    use super::TokenVerifier;
    use crate::{
        base64url,
        error::{AuthError, ReasonCode},
        events::{AuthEvent, TracingEvents},
        jwks::{SigningKey, SigningKeySet},
        key_source::{CognitoPool, KeySetSource, MockKeySetSource},
        testutil::{
            RecordingEvents, StaticKeySetSource, TEST_CLIENT_ID, TEST_POOL_ID, TEST_REGION,
            TEST_SUBJECT, TestKeyPair, id_token_claims, mint_id_token, mint_token, test_issuer,
        },
    };

    const KID: &str = "abc";

    fn verifier(keys: Arc<dyn KeySetSource>) -> TokenVerifier {
        TokenVerifier::new(
            &CognitoPool::new(TEST_REGION, TEST_POOL_ID),
            TEST_CLIENT_ID,
            keys,
            TracingEvents::shared("test"),
        )
    }

    fn first_key_verifier() -> TokenVerifier {
        verifier(Arc::new(StaticKeySetSource::with_first_key(KID)))
    }

    fn token_with(edit: impl FnOnce(&mut Map<String, Value>)) -> String {
        let mut claims = id_token_claims();
        edit(&mut claims);
        mint_token(
            &TestKeyPair::first(),
            &json!({"kid": KID, "alg": "RS256"}),
            &claims,
        )
    }

    async fn rejection(verifier: &TokenVerifier, token: &str) -> AuthError {
        verifier.verify(token).await.unwrap_err().into_cause()
    }

    #[tokio::test]
    async fn test_valid_token() {
        let events = Arc::new(RecordingEvents::default());
        let verifier = TokenVerifier::new(
            &CognitoPool::new(TEST_REGION, TEST_POOL_ID),
            TEST_CLIENT_ID,
            Arc::new(StaticKeySetSource::with_first_key(KID)),
            events.clone(),
        );
        assert_eq!(verifier.issuer(), test_issuer());
        assert_eq!(verifier.audience(), TEST_CLIENT_ID);

        let claims = verifier
            .verify(&mint_id_token(&TestKeyPair::first(), KID))
            .await
            .unwrap();
        assert_eq!(claims.subject(), Some(TEST_SUBJECT));
        assert_eq!(claims.email(), Some("jane.doe@example.com"));
        assert_eq!(claims.token_use(), Some("id"));
        assert_eq!(
            events.events(),
            vec![
                AuthEvent::KeyFound {
                    kid: KID.to_owned()
                },
                AuthEvent::TokenVerified {
                    subject: Some(TEST_SUBJECT.to_owned())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_audience_list() {
        let token = token_with(|claims| {
            claims.insert("aud".to_owned(), json!(["other", TEST_CLIENT_ID]));
        });
        first_key_verifier().verify(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_extra_claims_are_kept() {
        let token = token_with(|claims| {
            claims.insert("custom:plan".to_owned(), json!("pro"));
        });
        let claims = first_key_verifier().verify(&token).await.unwrap();
        assert_eq!(claims.get("custom:plan"), Some(&json!("pro")));
    }

    #[tokio::test]
    async fn test_missing_kid_does_not_fetch() {
        let mut source = MockKeySetSource::new();
        source.expect_fetch_key_set().never();
        let verifier = verifier(Arc::new(source));
        for header in [json!({"alg": "RS256"}), json!({"kid": "", "alg": "RS256"})] {
            let token = mint_token(&TestKeyPair::first(), &header, &id_token_claims());
            let err = verifier.verify(&token).await.unwrap_err();
            assert_eq!(err.reason(), ReasonCode::MissingKeyId, "{header}");
            assert_eq!(err.to_string(), "authentication failed");
        }
    }

    #[tokio::test]
    async fn test_malformed_token_does_not_fetch() {
        let mut source = MockKeySetSource::new();
        source.expect_fetch_key_set().never();
        let verifier = verifier(Arc::new(source));
        for token in ["", "not-a-token", "a.b", "a.b.c.d"] {
            assert!(matches!(
                rejection(&verifier, token).await,
                AuthError::MalformedToken(_)
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_kid() {
        let source = Arc::new(StaticKeySetSource::with_first_key(KID));
        let verifier = verifier(source.clone());
        let token = mint_id_token(&TestKeyPair::first(), "rotated-away");
        assert_eq!(
            rejection(&verifier, &token).await,
            AuthError::KeyNotFound("rotated-away".to_owned())
        );
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_key_fetch_failure() {
        let mut source = MockKeySetSource::new();
        source
            .expect_fetch_key_set()
            .times(1)
            .returning(|| Err(AuthError::KeyFetch("operation timed out".to_owned())));
        let events = Arc::new(RecordingEvents::default());
        let verifier = TokenVerifier::new(
            &CognitoPool::new(TEST_REGION, TEST_POOL_ID),
            TEST_CLIENT_ID,
            Arc::new(source),
            events.clone(),
        );
        let err = verifier
            .verify(&mint_id_token(&TestKeyPair::first(), KID))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), ReasonCode::KeyFetchError);
        assert!(matches!(
            events.events().as_slice(),
            [AuthEvent::TokenRejected {
                reason: ReasonCode::KeyFetchError,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn test_unusable_published_key() {
        let source = StaticKeySetSource::new(SigningKeySet::new(vec![SigningKey {
            kid: KID.to_owned(),
            kty: "RSA".to_owned(),
            alg: Some("RS256".to_owned()),
            key_use: Some("sig".to_owned()),
            n: None,
            e: Some("AQAB".to_owned()),
        }]));
        let err = rejection(
            &verifier(Arc::new(source)),
            &mint_id_token(&TestKeyPair::first(), KID),
        )
        .await;
        assert!(matches!(err, AuthError::InvalidKeyMaterial(_)), "{err:?}");

        let mut ec_key = TestKeyPair::first().jwk(KID);
        ec_key.kty = "EC".to_owned();
        let source = StaticKeySetSource::new(SigningKeySet::new(vec![ec_key]));
        let err = rejection(
            &verifier(Arc::new(source)),
            &mint_id_token(&TestKeyPair::first(), KID),
        )
        .await;
        assert_eq!(
            err,
            AuthError::InvalidKeyMaterial("Unsupported key type: EC".to_owned())
        );
        assert_eq!(err.reason(), ReasonCode::InvalidKeyMaterial);
    }

    #[tokio::test]
    async fn test_signed_by_another_key() {
        let token = mint_id_token(&TestKeyPair::second(), KID);
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::InvalidSignature
        );
    }

    #[tokio::test]
    async fn test_tampered_payload() {
        let token = mint_id_token(&TestKeyPair::first(), KID);
        let parts: Vec<&str> = token.split('.').collect();
        let mut claims = id_token_claims();
        claims.insert("sub".to_owned(), json!("someone-else"));
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            base64url::encode(&serde_json::to_vec(&claims).unwrap()),
            parts[2]
        );
        assert_eq!(
            rejection(&first_key_verifier(), &forged).await,
            AuthError::InvalidSignature
        );
    }

    #[tokio::test]
    async fn test_other_algorithms_are_refused() {
        for header in [
            json!({"kid": KID, "alg": "none"}),
            json!({"kid": KID, "alg": "HS256"}),
            json!({"kid": KID}),
        ] {
            let token = mint_token(&TestKeyPair::first(), &header, &id_token_claims());
            assert_eq!(
                rejection(&first_key_verifier(), &token).await,
                AuthError::InvalidSignature,
                "{header}"
            );
        }
    }

    #[tokio::test]
    async fn test_expiry() {
        let exp = Utc::now().timestamp() + 600;
        let token = token_with(|claims| {
            claims.insert("exp".to_owned(), json!(exp));
        });
        let verifier = first_key_verifier();

        let before = Utc.timestamp_opt(exp - 1, 0).unwrap();
        verifier.verify_at(&token, before).await.unwrap();

        for now in [exp, exp + 1] {
            let now = Utc.timestamp_opt(now, 0).unwrap();
            let err = verifier.verify_at(&token, now).await.unwrap_err();
            assert_eq!(err.reason(), ReasonCode::Expired);
        }

        let lenient = first_key_verifier().with_leeway(Duration::seconds(30));
        let now = Utc.timestamp_opt(exp + 10, 0).unwrap();
        lenient.verify_at(&token, now).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_wins_over_bad_audience() {
        let token = token_with(|claims| {
            claims.insert("exp".to_owned(), json!(Utc::now().timestamp() - 60));
            claims.insert("aud".to_owned(), json!("someone-else"));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::Expired
        );
    }

    #[tokio::test]
    async fn test_fractional_times() {
        let now = Utc::now().timestamp();
        let token = token_with(|claims| {
            claims.insert("exp".to_owned(), json!(now as f64 + 3600.5));
            claims.insert("nbf".to_owned(), json!(now as f64 - 0.5));
        });
        first_key_verifier().verify(&token).await.unwrap();

        let exp = now + 600;
        let token = token_with(|claims| {
            claims.insert("exp".to_owned(), json!(exp as f64 + 0.5));
        });
        let at_exp = Utc.timestamp_opt(exp, 0).unwrap();
        first_key_verifier().verify_at(&token, at_exp).await.unwrap();
        let after = Utc.timestamp_opt(exp, 500_000_000).unwrap();
        let err = first_key_verifier().verify_at(&token, after).await.unwrap_err();
        assert_eq!(err.reason(), ReasonCode::Expired);
    }

    #[tokio::test]
    async fn test_mistyped_claims_fail_their_own_check() {
        // an expired token with a numeric subject is still just expired
        let token = token_with(|claims| {
            claims.insert("exp".to_owned(), json!(1));
            claims.insert("sub".to_owned(), json!(12345));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::Expired
        );
        let token = token_with(|claims| {
            claims.insert("exp".to_owned(), json!("tomorrow"));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::Expired
        );
        let token = token_with(|claims| {
            claims.insert("aud".to_owned(), json!(42));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::InvalidAudience(TEST_CLIENT_ID.to_owned())
        );
        let token = token_with(|claims| {
            claims.insert("iss".to_owned(), json!(7));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::InvalidIssuer(test_issuer())
        );
        let token = token_with(|claims| {
            claims.insert("token_use".to_owned(), json!(1));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::WrongTokenClass("1".to_owned())
        );

        // a valid token whose subject is not a string verifies, without a subject
        let token = token_with(|claims| {
            claims.insert("sub".to_owned(), json!(12345));
        });
        let claims = first_key_verifier().verify(&token).await.unwrap();
        assert_eq!(claims.subject(), None);
        assert_eq!(claims.get("sub"), Some(&json!(12345)));
    }

    #[tokio::test]
    async fn test_missing_exp() {
        let token = token_with(|claims| {
            claims.remove("exp");
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::Expired
        );
    }

    #[tokio::test]
    async fn test_not_yet_valid() {
        let token = token_with(|claims| {
            claims.insert("nbf".to_owned(), json!(Utc::now().timestamp() + 300));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::NotYetValid
        );
    }

    #[tokio::test]
    async fn test_wrong_audience() {
        let token = token_with(|claims| {
            claims.insert("aud".to_owned(), json!("another-app-client"));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::InvalidAudience(TEST_CLIENT_ID.to_owned())
        );
        let token = token_with(|claims| {
            claims.remove("aud");
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await.reason(),
            ReasonCode::InvalidAudience
        );
    }

    #[tokio::test]
    async fn test_wrong_issuer() {
        let token = token_with(|claims| {
            claims.insert(
                "iss".to_owned(),
                json!("https://cognito-idp.eu-west-3.amazonaws.com/eu-west-3_Other"),
            );
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::InvalidIssuer(test_issuer())
        );
    }

    #[tokio::test]
    async fn test_access_token_is_refused() {
        let token = token_with(|claims| {
            claims.insert("token_use".to_owned(), json!("access"));
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::WrongTokenClass("access".to_owned())
        );
        let token = token_with(|claims| {
            claims.remove("token_use");
        });
        assert_eq!(
            rejection(&first_key_verifier(), &token).await,
            AuthError::WrongTokenClass(String::new())
        );
    }

    #[tokio::test]
    async fn test_key_rotation() {
        let source = Arc::new(StaticKeySetSource::new(SigningKeySet::new(vec![
            TestKeyPair::first().jwk("old"),
            TestKeyPair::second().jwk("new"),
        ])));
        let verifier = verifier(source.clone());
        verifier
            .verify(&mint_id_token(&TestKeyPair::first(), "old"))
            .await
            .unwrap();
        verifier
            .verify(&mint_id_token(&TestKeyPair::second(), "new"))
            .await
            .unwrap();
        // signed by the new key but announcing the old one
        assert_eq!(
            rejection(&verifier, &mint_id_token(&TestKeyPair::second(), "old")).await,
            AuthError::InvalidSignature
        );
        // no cache: one fetch per verification
        assert_eq!(source.fetches(), 3);
    }
}
