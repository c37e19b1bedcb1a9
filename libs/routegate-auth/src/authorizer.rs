use std::sync::Arc;

use routegate_security::Principal;

use crate::{errors::AuthError, policy::PolicyRegistry, types::AccessRequirement};

/// Evaluates route access requirements against a principal
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    registry: Arc<PolicyRegistry>,
}

impl Authorizer {
    #[must_use]
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Check the principal against the requirement.
    ///
    /// Policies are conjunctive. Roles, when present, pass if any one of them is held;
    /// the role group is AND-ed with the policy group.
    ///
    /// # Errors
    /// - [`AuthError::Unauthenticated`] for an unauthenticated principal
    /// - [`AuthError::UnknownPolicy`] if a named policy is not registered
    /// - [`AuthError::Forbidden`] if any constraint is not satisfied
    pub fn authorize(
        &self,
        principal: &Principal,
        requirement: &AccessRequirement,
    ) -> Result<(), AuthError> {
        if !principal.is_authenticated() {
            return Err(AuthError::Unauthenticated);
        }

        for name in &requirement.policies {
            let policy = self
                .registry
                .get(name)
                .ok_or_else(|| AuthError::UnknownPolicy(name.clone()))?;
            if !policy.evaluate(principal) {
                tracing::debug!(policy = %name, subject = ?principal.subject(), "Policy denied");
                return Err(AuthError::Forbidden);
            }
        }

        if !requirement.roles.is_empty()
            && !requirement.roles.iter().any(|r| principal.is_in_role(r))
        {
            tracing::debug!(roles = ?requirement.roles, subject = ?principal.subject(), "Role check denied");
            return Err(AuthError::Forbidden);
        }

        Ok(())
    }
}
