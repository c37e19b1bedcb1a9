//! Route binding.
//!
//! Expands a validated descriptor into one [`RouteBinding`] per `(route, verb)` pair,
//! each carrying the authorization requirement the guard enforces at request time.

use http::Method;
use routegate_auth::{AccessRequirement, AuthRequirement};

use crate::descriptor::{EndpointDescriptor, EndpointHandler};

/// One route-table entry
#[derive(Debug, Clone)]
pub struct RouteBinding {
    pub route: String,
    pub verb: Method,
    pub endpoint: String,
    pub requirement: AuthRequirement,
    pub handler: EndpointHandler,
}

/// Authorization requirement for every binding of `descriptor`.
///
/// Precedence: disabled authorization, then anonymous access, then the declared
/// policies (plus the synthesized one, appended last) and roles.
#[must_use]
pub fn requirement_for(
    descriptor: &EndpointDescriptor,
    synthesized_policy: Option<&str>,
    authorization_enabled: bool,
) -> AuthRequirement {
    if !authorization_enabled {
        return AuthRequirement::Unconstrained;
    }
    if descriptor.allow_anonymous() {
        return AuthRequirement::Anonymous;
    }

    let mut policies = descriptor.policies().to_vec();
    if let Some(name) = synthesized_policy {
        policies.push(name.to_owned());
    }
    AuthRequirement::Authorized(AccessRequirement::new(policies, descriptor.roles().to_vec()))
}

/// Bindings for every `(route, verb)` of `descriptor`, route-major in declaration order
#[must_use]
pub fn bind(
    descriptor: &EndpointDescriptor,
    synthesized_policy: Option<&str>,
    authorization_enabled: bool,
) -> Vec<RouteBinding> {
    let requirement = requirement_for(descriptor, synthesized_policy, authorization_enabled);

    descriptor
        .routes()
        .iter()
        .flat_map(|route| {
            descriptor.verbs().iter().map(|verb| RouteBinding {
                route: route.clone(),
                verb: verb.clone(),
                endpoint: descriptor.name().to_owned(),
                requirement: requirement.clone(),
                handler: descriptor.handler().clone(),
            })
        })
        .collect()
}
