//! Conversion of a published JWK into a usable RSA public key.

use rsa::{
    BigUint, RsaPublicKey,
    pkcs1v15::{Signature, VerifyingKey},
    sha2::Sha256,
    signature::Verifier,
};

use crate::{base64url, error::AuthError, jwks::SigningKey, result::AuthResult};

/// The public key reconstructed from a [`SigningKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    key: RsaPublicKey,
}

impl PublicKeyMaterial {
    #[must_use]
    pub const fn rsa(&self) -> &RsaPublicKey {
        &self.key
    }

    /// Verify an RS256 (RSASSA-PKCS1-v1_5 with SHA-256) signature over `message`.
    pub fn verify_rs256(&self, message: &[u8], signature: &[u8]) -> AuthResult<()> {
        let signature = Signature::try_from(signature).map_err(|_| AuthError::InvalidSignature)?;
        VerifyingKey::<Sha256>::new(self.key.clone())
            .verify(message, &signature)
            .map_err(|_| AuthError::InvalidSignature)
    }
}

impl TryFrom<&SigningKey> for PublicKeyMaterial {
    type Error = AuthError;

    fn try_from(jwk: &SigningKey) -> AuthResult<Self> {
        to_public_key(jwk)
    }
}

/// Build the public key described by `jwk`.
///
/// Only RSA keys are supported. The modulus `n` and exponent `e` are base64url encoded
/// big-endian unsigned integers.
pub fn to_public_key(jwk: &SigningKey) -> AuthResult<PublicKeyMaterial> {
    if jwk.kty != "RSA" {
        return Err(AuthError::UnsupportedKeyType(jwk.kty.clone()));
    }
    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        return Err(AuthError::InvalidKeyMaterial(
            "Invalid RSA JWK: missing 'n' or 'e'".to_owned(),
        ));
    };
    let n = decode_unsigned(n, "n")?;
    let e = decode_unsigned(e, "e")?;
    let key = RsaPublicKey::new(n, e)
        .map_err(|e| AuthError::InvalidKeyMaterial(format!("Invalid RSA public key: {e}")))?;
    Ok(PublicKeyMaterial { key })
}

fn decode_unsigned(value: &str, name: &str) -> AuthResult<BigUint> {
    let bytes = base64url::decode(value)
        .map_err(|e| AuthError::InvalidKeyMaterial(format!("Invalid RSA JWK '{name}': {e}")))?;
    let integer = BigUint::from_bytes_be(&bytes);
    if integer == BigUint::from(0_u8) {
        return Err(AuthError::InvalidKeyMaterial(format!(
            "Invalid RSA JWK: '{name}' is zero"
        )));
    }
    Ok(integer)
}
