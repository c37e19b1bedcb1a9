//! Registration driver.
//!
//! Runs the whole startup pass: discover, instantiate, validate, synthesize, bind.
//! Results are accumulated locally and only handed out when every endpoint succeeded,
//! so a failed pass leaves no partial route table or policy registry behind.

use std::sync::Arc;

use routegate_auth::{Authorizer, PolicyError, PolicyRegistry, PolicyRegistryBuilder};

use crate::binder::{self, RouteBinding};
use crate::catalog::Catalog;
use crate::descriptor::EndpointDescriptor;
use crate::errors::{ConfigurationIssue, RegistrationError};
use crate::synthesizer::PolicySynthesizer;

/// Configures and executes a registration pass
pub struct Registrar {
    authorization_enabled: bool,
    policies: PolicyRegistryBuilder,
}

impl Registrar {
    #[must_use]
    pub fn new(authorization_enabled: bool) -> Self {
        Self {
            authorization_enabled,
            policies: PolicyRegistryBuilder::new(),
        }
    }

    /// Seed the pass with host-defined named policies that endpoints may reference
    #[must_use]
    pub fn with_policies(mut self, policies: PolicyRegistryBuilder) -> Self {
        self.policies = policies;
        self
    }

    /// Execute the pass against `catalog`.
    ///
    /// # Errors
    /// - [`RegistrationError::Discovery`] if the catalog yields nothing
    /// - [`RegistrationError::Instantiation`] if an endpoint factory fails
    /// - [`RegistrationError::Configuration`] if an endpoint declaration is invalid or
    ///   references a policy that does not exist
    pub fn register(self, catalog: &Catalog) -> Result<Registration, RegistrationError> {
        let Self {
            authorization_enabled,
            mut policies,
        } = self;

        if !authorization_enabled {
            tracing::warn!("Authorization is disabled: every route will be bound without constraints");
        }

        let discovered = catalog.discover()?;
        tracing::debug!(count = discovered.len(), "Discovered endpoint types");

        let mut synthesizer = PolicySynthesizer::new(authorization_enabled);
        let mut descriptors = Vec::with_capacity(discovered.len());
        let mut bindings = Vec::new();

        for endpoint in &discovered {
            let instance =
                endpoint
                    .instantiate()
                    .map_err(|err| RegistrationError::Instantiation {
                        endpoint: endpoint.name().to_owned(),
                        source: err.into(),
                    })?;

            let descriptor = EndpointDescriptor::read(endpoint.name(), instance)
                .map_err(|issue| configuration(endpoint.name(), issue))?;

            if authorization_enabled
                && !descriptor.allow_anonymous()
                && let Some(unknown) = descriptor
                    .policies()
                    .iter()
                    .find(|name| !policies.contains(name))
            {
                return Err(configuration(
                    descriptor.name(),
                    ConfigurationIssue::UnknownPolicy(unknown.clone()),
                ));
            }

            let synthesized = synthesizer
                .synthesize_into(&descriptor, &mut policies)
                .map_err(|err| configuration(descriptor.name(), policy_issue(err)))?;

            let endpoint_bindings =
                binder::bind(&descriptor, synthesized.as_deref(), authorization_enabled);
            for binding in &endpoint_bindings {
                tracing::debug!(
                    endpoint = %binding.endpoint,
                    verb = %binding.verb,
                    route = %binding.route,
                    requirement = ?binding.requirement,
                    "Bound route"
                );
            }

            bindings.extend(endpoint_bindings);
            descriptors.push(descriptor);
        }

        let policies = Arc::new(policies.build());
        tracing::info!(
            endpoints = descriptors.len(),
            bindings = bindings.len(),
            policies = policies.len(),
            authorization_enabled,
            "Endpoint registration complete"
        );

        Ok(Registration {
            bindings,
            policies,
            descriptors,
            authorization_enabled,
        })
    }
}

fn configuration(endpoint: &str, issue: ConfigurationIssue) -> RegistrationError {
    RegistrationError::Configuration {
        endpoint: endpoint.to_owned(),
        issue,
    }
}

fn policy_issue(err: PolicyError) -> ConfigurationIssue {
    match err {
        PolicyError::Duplicate(name) => ConfigurationIssue::DuplicatePolicy(name),
        PolicyError::EmptyName => ConfigurationIssue::EmptyPolicyName,
    }
}

/// Result of a successful registration pass; immutable from here on
#[derive(Debug, Clone)]
pub struct Registration {
    bindings: Vec<RouteBinding>,
    policies: Arc<PolicyRegistry>,
    descriptors: Vec<EndpointDescriptor>,
    authorization_enabled: bool,
}

impl Registration {
    #[must_use]
    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn descriptors(&self) -> &[EndpointDescriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn policies(&self) -> &Arc<PolicyRegistry> {
        &self.policies
    }

    #[must_use]
    pub fn authorization_enabled(&self) -> bool {
        self.authorization_enabled
    }

    /// Authorizer backed by the frozen policy registry
    #[must_use]
    pub fn authorizer(&self) -> Authorizer {
        Authorizer::new(Arc::clone(&self.policies))
    }
}
