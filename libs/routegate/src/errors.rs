use std::error::Error as StdError;

use thiserror::Error;

/// Why an endpoint's declaration cannot be bound
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationIssue {
    #[error("endpoint declares no HTTP verbs")]
    EmptyVerbs,

    #[error("endpoint declares no routes")]
    EmptyRoutes,

    #[error("endpoint exposes no request handler")]
    MissingHandler,

    #[error("route template '{0}' is malformed (expected an absolute path with {{param}} placeholders)")]
    InvalidRoute(String),

    #[error("HTTP verb '{0}' is not supported")]
    UnsupportedVerb(String),

    #[error("endpoint references unknown authorization policy '{0}'")]
    UnknownPolicy(String),

    #[error("authorization policy '{0}' is already registered")]
    DuplicatePolicy(String),

    #[error("authorization policy name must not be empty")]
    EmptyPolicyName,
}

/// Startup failed before any endpoint could be inspected
#[derive(Debug, Error)]
#[error("no endpoint types discovered ({excluded} candidate(s) excluded by namespace filter)")]
pub struct DiscoveryError {
    pub excluded: usize,
}

/// Failure of a registration pass. Nothing is registered when this is returned.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("endpoint '{endpoint}' is misconfigured: {issue}")]
    Configuration {
        endpoint: String,
        #[source]
        issue: ConfigurationIssue,
    },

    #[error("endpoint '{endpoint}' could not be instantiated: {source}")]
    Instantiation {
        endpoint: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl RegistrationError {
    /// Name of the offending endpoint, if the failure concerns a single one
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Discovery(_) => None,
            Self::Configuration { endpoint, .. } | Self::Instantiation { endpoint, .. } => {
                Some(endpoint)
            }
        }
    }
}

/// Failure while mounting bindings onto an axum router
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("{verb} {route} is bound by both '{first}' and '{second}'")]
    DuplicateRoute {
        route: String,
        verb: String,
        first: String,
        second: String,
    },

    #[error("route '{route}' cannot be mounted: {reason}")]
    InvalidRoute { route: String, reason: String },

    #[error("authorization is enforced but no token validator was supplied")]
    MissingValidator,
}
