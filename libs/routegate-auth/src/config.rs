use crate::{
    config_error::ConfigError,
    jwt::{HmacTokenValidator, ValidationConfig},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Authentication and authorization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Global switch. When `false`, routes are bound without any authorization constraint.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Raw symmetric key used to verify HS256 bearer tokens
    #[serde(default = "empty_secret", serialize_with = "redact")]
    pub signing_secret: SecretString,

    /// Required token issuer (if unset, any issuer is accepted)
    #[serde(default)]
    pub issuer: Option<String>,

    /// Required token audience (if unset, the audience is not checked)
    #[serde(default)]
    pub audience: Option<String>,

    /// Leeway in seconds for time-based validations (exp, nbf)
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_leeway() -> u64 {
    60
}

fn empty_secret() -> SecretString {
    SecretString::from("")
}

fn redact<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    if secret.expose_secret().is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("***")
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            signing_secret: empty_secret(),
            issuer: None,
            audience: None,
            leeway_seconds: 60,
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            leeway_seconds: self.leeway_seconds,
        }
    }

    /// Build the bearer-token validator.
    ///
    /// Returns `Ok(None)` when authorization is disabled.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSigningSecret`] if authorization is enabled
    /// and the signing secret is empty.
    pub fn build_validator(&self) -> Result<Option<HmacTokenValidator>, ConfigError> {
        if !self.enabled {
            return Ok(None);
        }
        if self.signing_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingSigningSecret);
        }

        tracing::info!(
            issuer = ?self.issuer,
            audience = ?self.audience,
            "Bearer token validator initialized (HS256)"
        );
        Ok(Some(HmacTokenValidator::new(
            &self.signing_secret,
            &self.validation_config(),
        )))
    }
}
