//! Named authorization policies.
//!
//! Policies are registered once during startup through [`PolicyRegistryBuilder`] and
//! frozen into an immutable [`PolicyRegistry`] that request handlers read concurrently.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use routegate_security::Principal;

use crate::errors::PolicyError;
use crate::traits::AuthorizationPolicy;

/// Mutable registration slot for policies, used only during startup
#[derive(Default)]
pub struct PolicyRegistryBuilder {
    policies: HashMap<String, Arc<dyn AuthorizationPolicy>>,
}

impl PolicyRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named policy.
    ///
    /// # Errors
    /// Returns [`PolicyError::Duplicate`] if the name is taken and
    /// [`PolicyError::EmptyName`] if the name is empty.
    pub fn add_policy<P>(&mut self, name: impl Into<String>, policy: P) -> Result<(), PolicyError>
    where
        P: AuthorizationPolicy + 'static,
    {
        self.add_shared(name, Arc::new(policy))
    }

    /// Register an already shared policy.
    ///
    /// # Errors
    /// Same as [`PolicyRegistryBuilder::add_policy`].
    pub fn add_shared(
        &mut self,
        name: impl Into<String>,
        policy: Arc<dyn AuthorizationPolicy>,
    ) -> Result<(), PolicyError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PolicyError::EmptyName);
        }
        if self.policies.contains_key(&name) {
            return Err(PolicyError::Duplicate(name));
        }
        tracing::debug!(policy = %name, "Registered authorization policy");
        self.policies.insert(name, policy);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    #[must_use]
    pub fn build(self) -> PolicyRegistry {
        PolicyRegistry {
            policies: self.policies,
        }
    }
}

impl fmt::Debug for PolicyRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistryBuilder")
            .field("policies", &self.policies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Immutable set of registered policies
#[derive(Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Arc<dyn AuthorizationPolicy>>,
}

impl PolicyRegistry {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AuthorizationPolicy>> {
        self.policies.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Registered policy names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("policies", &self.names())
            .finish()
    }
}

/// Policy that passes when the principal carries a claim of the given type,
/// optionally restricted to a set of accepted values.
#[derive(Debug, Clone)]
pub struct ClaimPolicy {
    kind: String,
    accepted: Vec<String>,
}

impl ClaimPolicy {
    /// Require the claim to be present with any value
    pub fn present(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            accepted: Vec::new(),
        }
    }

    /// Require the claim to carry one of the accepted values
    pub fn one_of<I, S>(kind: impl Into<String>, accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }
}

impl AuthorizationPolicy for ClaimPolicy {
    fn evaluate(&self, principal: &Principal) -> bool {
        principal
            .claims()
            .iter()
            .filter(|c| c.kind == self.kind)
            .any(|c| self.accepted.is_empty() || self.accepted.contains(&c.value))
    }
}
