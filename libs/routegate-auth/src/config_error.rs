use thiserror::Error;

/// Errors that can occur while building the authentication stack from configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("authorization is enabled but no signing secret is configured")]
    MissingSigningSecret,
}
