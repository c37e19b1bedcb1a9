//! Symmetric (HS256) bearer-token validation.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use routegate_security::Principal;
use secrecy::{ExposeSecret, SecretString};

use crate::{claims::TokenClaims, errors::AuthError, traits::TokenValidator};

/// Configuration for token validation
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Required issuer (if `None`, any issuer is accepted)
    pub issuer: Option<String>,

    /// Required audience (if `None`, the audience is not checked)
    pub audience: Option<String>,

    /// Leeway in seconds for time-based validations (exp, nbf)
    pub leeway_seconds: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            issuer: None,
            audience: None,
            leeway_seconds: 60,
        }
    }
}

/// Validates HS256 tokens signed with a shared secret.
///
/// The secret is used as-is; its strength is not checked here.
pub struct HmacTokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl HmacTokenValidator {
    #[must_use]
    pub fn new(secret: &SecretString, config: &ValidationConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Decode and verify a token synchronously.
    ///
    /// # Errors
    /// [`AuthError::TokenExpired`] for an expired token, [`AuthError::InvalidToken`] otherwise.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(err.to_string()),
            })
    }
}

#[async_trait]
impl TokenValidator for HmacTokenValidator {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        self.decode(token).map(TokenClaims::into_principal)
    }
}
