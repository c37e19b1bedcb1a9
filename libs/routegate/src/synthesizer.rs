//! Permission policy synthesis.
//!
//! Endpoints list the permissions they require; the synthesizer turns that list into
//! a named [`PermissionPolicy`] so endpoint authors never write evaluation code.

use routegate_auth::{AuthorizationPolicy, PolicyError, PolicyRegistryBuilder};
use routegate_security::{PermissionSet, Principal};

use crate::descriptor::EndpointDescriptor;

/// How required permissions are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMatch {
    /// Every required permission must be held (AND)
    All,
    /// At least one required permission must be held (OR)
    Any,
}

impl PermissionMatch {
    #[must_use]
    pub fn from_allow_any(allow_any: bool) -> Self {
        if allow_any { Self::Any } else { Self::All }
    }
}

/// Policy checking the principal's `Permissions` claim against a required set
#[derive(Debug, Clone)]
pub struct PermissionPolicy {
    name: String,
    required: PermissionSet,
    mode: PermissionMatch,
}

impl PermissionPolicy {
    #[must_use]
    pub fn new(name: impl Into<String>, required: PermissionSet, mode: PermissionMatch) -> Self {
        Self {
            name: name.into(),
            required,
            mode,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn required(&self) -> &PermissionSet {
        &self.required
    }

    #[must_use]
    pub fn mode(&self) -> PermissionMatch {
        self.mode
    }
}

impl AuthorizationPolicy for PermissionPolicy {
    fn evaluate(&self, principal: &Principal) -> bool {
        let held = principal.permissions();
        match self.mode {
            PermissionMatch::All => held.contains_all(&self.required),
            PermissionMatch::Any => held.contains_any(&self.required),
        }
    }
}

/// Produces at most one permission policy per descriptor.
///
/// Names follow `"{descriptor}::permissions#{ordinal}"`; the ordinal counts the
/// policies synthesized by this instance, so one instance must be used per
/// registration pass.
#[derive(Debug)]
pub struct PolicySynthesizer {
    authorization_enabled: bool,
    next_ordinal: usize,
}

impl PolicySynthesizer {
    #[must_use]
    pub fn new(authorization_enabled: bool) -> Self {
        Self {
            authorization_enabled,
            next_ordinal: 0,
        }
    }

    /// Policy for `descriptor`, or `None` when authorization is disabled or the
    /// descriptor requires no permissions
    pub fn synthesize(&mut self, descriptor: &EndpointDescriptor) -> Option<PermissionPolicy> {
        if !self.authorization_enabled || descriptor.permissions().is_empty() {
            return None;
        }

        let name = format!("{}::permissions#{}", descriptor.name(), self.next_ordinal);
        self.next_ordinal += 1;

        Some(PermissionPolicy::new(
            name,
            descriptor.permissions().iter().cloned().collect(),
            PermissionMatch::from_allow_any(descriptor.allow_any_permission()),
        ))
    }

    /// Synthesize and register the policy for `descriptor`, returning its name.
    ///
    /// # Errors
    /// Returns [`PolicyError`] if the generated name is already taken in `registry`.
    pub fn synthesize_into(
        &mut self,
        descriptor: &EndpointDescriptor,
        registry: &mut PolicyRegistryBuilder,
    ) -> Result<Option<String>, PolicyError> {
        let Some(policy) = self.synthesize(descriptor) else {
            return Ok(None);
        };
        let name = policy.name().to_owned();
        registry.add_policy(name.clone(), policy)?;
        tracing::debug!(endpoint = descriptor.name(), policy = %name, "Synthesized permission policy");
        Ok(Some(name))
    }
}
