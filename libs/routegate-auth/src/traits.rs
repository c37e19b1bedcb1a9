use crate::errors::AuthError;
use async_trait::async_trait;
use routegate_security::Principal;

/// Validates a bearer token and turns it into a principal
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError>;
}

/// A named authorization predicate evaluated against the request principal
pub trait AuthorizationPolicy: Send + Sync {
    fn evaluate(&self, principal: &Principal) -> bool;
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&Principal) -> bool + Send + Sync,
{
    fn evaluate(&self, principal: &Principal) -> bool {
        self(principal)
    }
}
