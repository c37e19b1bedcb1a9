//! Materializes a [`Registration`] into an [`axum::Router`].

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn_with_state,
    routing::{MethodFilter, MethodRouter, on},
};
use http::Method;
use routegate_auth::{
    AuthRequirement, TokenValidator,
    axum_ext::{GuardContext, RouteGuard, guard_route},
};

use crate::binder::RouteBinding;
use crate::errors::RouterError;
use crate::registrar::Registration;

#[derive(Default)]
struct PathEntry {
    methods: Option<MethodRouter>,
    bound: Vec<(Method, String)>,
}

impl Registration {
    /// Build the HTTP router for this registration.
    ///
    /// Bindings sharing a path are merged into one method router. Every binding
    /// except an `Unconstrained` one gets its own guard layer. `validator` is
    /// required as soon as one binding is guarded.
    ///
    /// # Errors
    /// - [`RouterError::DuplicateRoute`] if two bindings claim the same `(route, verb)`
    /// - [`RouterError::InvalidRoute`] if a path conflicts with another or is not a
    ///   valid template
    /// - [`RouterError::MissingValidator`] if guards are needed and `validator` is `None`
    pub fn into_router(
        self,
        validator: Option<Arc<dyn TokenValidator>>,
    ) -> Result<Router, RouterError> {
        let guarded = self
            .bindings()
            .iter()
            .any(|b| b.requirement != AuthRequirement::Unconstrained);

        let ctx = if guarded {
            let validator = validator.ok_or(RouterError::MissingValidator)?;
            Some(GuardContext::new(validator, self.authorizer()))
        } else {
            None
        };

        let mut paths: BTreeMap<String, PathEntry> = BTreeMap::new();
        // Same matchit line as axum, so its insert errors are the ones axum would panic on.
        let mut matcher = matchit::Router::new();

        for binding in self.bindings() {
            if !paths.contains_key(&binding.route) {
                matcher
                    .insert(binding.route.as_str(), ())
                    .map_err(|err| RouterError::InvalidRoute {
                        route: binding.route.clone(),
                        reason: err.to_string(),
                    })?;
            }
            let entry = paths.entry(binding.route.clone()).or_default();

            if let Some((_, first)) = entry.bound.iter().find(|(verb, _)| *verb == binding.verb) {
                return Err(RouterError::DuplicateRoute {
                    route: binding.route.clone(),
                    verb: binding.verb.to_string(),
                    first: first.clone(),
                    second: binding.endpoint.clone(),
                });
            }

            let method_router = method_router_for(binding, ctx.as_ref())?;
            entry.methods = Some(match entry.methods.take() {
                Some(existing) => existing.merge(method_router),
                None => method_router,
            });
            entry
                .bound
                .push((binding.verb.clone(), binding.endpoint.clone()));
        }

        let mut router = Router::new();
        for (path, entry) in paths {
            if let Some(methods) = entry.methods {
                router = router.route(&path, methods);
            }
        }

        tracing::debug!(bindings = self.bindings().len(), "HTTP router assembled");
        Ok(router)
    }
}

fn method_router_for(
    binding: &RouteBinding,
    ctx: Option<&GuardContext>,
) -> Result<MethodRouter, RouterError> {
    let filter = MethodFilter::try_from(binding.verb.clone()).map_err(|err| {
        RouterError::InvalidRoute {
            route: binding.route.clone(),
            reason: err.to_string(),
        }
    })?;

    let handler = binding.handler.clone();
    let method_router = on(filter, move |request: Request| async move {
        handler.call(request).await
    });

    Ok(match (&binding.requirement, ctx) {
        (AuthRequirement::Unconstrained, _) | (_, None) => method_router,
        (requirement, Some(ctx)) => method_router.route_layer(from_fn_with_state(
            RouteGuard::new(requirement.clone(), ctx.clone()),
            guard_route,
        )),
    })
}
