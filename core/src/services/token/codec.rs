//! Signed token codec
//!
//! Access and refresh tokens share one HS256 JWT format and differ only in
//! their `kind` claim and lifetime. Expiry is judged against the injected
//! [`Clock`], so `jsonwebtoken`'s own wall-clock `exp` check is disabled.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::entities::token::{Claims, TokenKind};
use crate::errors::TokenError;

use super::config::TokenServiceConfig;

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
    pub expires_at: DateTime<Utc>,
}

/// Encodes subjects into signed tokens and decodes them back into verified claims
pub struct TokenCodec {
    issuer: String,
    audience: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(config: &TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Signs a token for `subject` valid for `ttl` from now
    ///
    /// # Errors
    /// * `TokenError::Internal` - The signing backend failed
    pub fn issue(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.now();
        let claims = Claims::new(
            subject,
            kind,
            issued_at,
            issued_at + ttl,
            &self.issuer,
            &self.audience,
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::internal(format!("failed to sign {kind} token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
            claims,
        })
    }

    /// Verifies signature and shape, then expiry
    ///
    /// A token that fails structurally is `TokenInvalid` even if it is also
    /// past its expiry.
    ///
    /// # Errors
    /// * `TokenError::TokenInvalid` - Bad signature, structure, issuer, audience or claims
    /// * `TokenError::TokenExpired` - Valid token whose `exp` lies before now
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode_claims(token)?;
        self.check_expiry(claims)
    }

    /// Like [`verify`](Self::verify), additionally requiring a token of `kind`
    ///
    /// A token of the wrong kind is `TokenInvalid` whatever its expiry.
    pub fn verify_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.decode_claims(token)?;
        if claims.kind != kind {
            return Err(TokenError::TokenInvalid);
        }
        self.check_expiry(claims)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::TokenInvalid)
    }

    fn check_expiry(&self, claims: Claims) -> Result<Claims, TokenError> {
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::TokenExpired);
        }
        Ok(claims)
    }
}
