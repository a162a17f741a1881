//! HS256 token issue/verify.
//!
//! The codec verifies the signature; the time-window checks are the pure
//! [`validate_claims`](crate::validate_claims) function so they stay testable
//! without key material.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use kidloop_core::UserId;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("token is malformed or has a bad signature")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Access/refresh token pair handed out by register/login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token issue/verify boundary used by the API layer.
pub trait TokenCodec: Send + Sync {
    fn issue_pair(
        &self,
        user: UserId,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError>;

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HMAC-SHA256 codec over a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(7),
        }
    }

    fn encode(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue_pair(
        &self,
        user: UserId,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let claims = |ttl: Duration| JwtClaims {
            sub: user,
            email: email.to_string(),
            role,
            issued_at: now,
            expires_at: now + ttl,
        };

        Ok(TokenPair {
            access_token: self.encode(&claims(self.access_ttl))?,
            refresh_token: self.encode(&claims(self.refresh_ttl))?,
        })
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Expiry lives in `expires_at`, not the registered `exp` claim, so the
        // library's own time checks are disabled and validate_claims runs instead.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_access_token_verifies() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let user = UserId::new();
        let now = Utc::now();

        let pair = codec
            .issue_pair(user, "a@example.com", Role::Seller, now)
            .unwrap();
        let claims = codec.verify(&pair.access_token, now).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.role, Role::Seller);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let codec = Hs256TokenCodec::new(b"secret-a");
        let other = Hs256TokenCodec::new(b"secret-b");
        let now = Utc::now();

        let pair = other
            .issue_pair(UserId::new(), "a@example.com", Role::Customer, now)
            .unwrap();

        assert!(matches!(
            codec.verify(&pair.access_token, now),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let issued = Utc::now() - Duration::days(2);

        let pair = codec
            .issue_pair(UserId::new(), "a@example.com", Role::Customer, issued)
            .unwrap();

        assert!(matches!(
            codec.verify(&pair.access_token, Utc::now()),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }
}
