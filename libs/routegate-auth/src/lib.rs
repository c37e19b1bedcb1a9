#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

// Core modules
pub mod claims;
pub mod errors;
pub mod traits;
pub mod types;

pub mod authorizer;
pub mod jwt;
pub mod policy;

// Configuration
pub mod config;
pub mod config_error;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

// Core exports
pub use authorizer::Authorizer;
pub use claims::TokenClaims;
pub use errors::{AuthError, PolicyError};
pub use policy::{ClaimPolicy, PolicyRegistry, PolicyRegistryBuilder};
pub use traits::{AuthorizationPolicy, TokenValidator};
pub use types::{AccessRequirement, AuthRequirement};

pub use config::AuthConfig;
pub use config_error::ConfigError;
pub use jwt::{HmacTokenValidator, ValidationConfig};
