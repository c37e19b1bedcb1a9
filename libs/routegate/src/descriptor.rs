//! Endpoint descriptors.
//!
//! An [`Endpoint`] declares its routes, verbs and access requirements through plain
//! accessors. During registration every endpoint instance is read exactly once into an
//! immutable, validated [`EndpointDescriptor`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
    routing::MethodFilter,
};
use futures_util::future::BoxFuture;
use http::Method;

use crate::errors::ConfigurationIssue;

/// Request-handling function bound to every `(route, verb)` of an endpoint.
///
/// Cloning is cheap; all clones share the same function.
#[derive(Clone)]
pub struct EndpointHandler(Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>);

impl EndpointHandler {
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self(Arc::new(move |req| {
            let fut = f(req);
            Box::pin(async move { fut.await.into_response() })
        }))
    }

    /// Handler that receives a shared reference to `state` on every call.
    ///
    /// Typical use is `EndpointHandler::with_state(self, Self::handle)` from
    /// [`Endpoint::handler`]. The state is shared by all concurrent invocations.
    pub fn with_state<T, F, Fut, R>(state: Arc<T>, f: F) -> Self
    where
        T: Send + Sync + ?Sized + 'static,
        F: Fn(Arc<T>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(move |req| f(Arc::clone(&state), req))
    }

    pub async fn call(&self, request: Request) -> Response {
        (self.0)(request).await
    }
}

impl fmt::Debug for EndpointHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EndpointHandler")
    }
}

/// Declarative definition of one API endpoint.
///
/// Only `verbs`, `routes` and `handler` are mandatory; the access accessors default to
/// "authenticated, no further constraint".
pub trait Endpoint: Send + Sync + 'static {
    /// HTTP methods served by this endpoint. Must not be empty.
    fn verbs(&self) -> Vec<Method>;

    /// Path templates (axum syntax, e.g. `/orders/{id}`). Must not be empty.
    fn routes(&self) -> Vec<String>;

    /// Public endpoint. Takes precedence over every other access setting.
    fn allow_anonymous(&self) -> bool {
        false
    }

    /// Named policies that must all pass.
    fn policies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Roles; holding any one of them is enough.
    fn roles(&self) -> Vec<String> {
        Vec::new()
    }

    /// Required permission identifiers.
    fn permissions(&self) -> Vec<String> {
        Vec::new()
    }

    /// `true`: any one permission is enough. `false`: all of them are required.
    fn allow_any_permission(&self) -> bool {
        false
    }

    /// The request handler; `None` means the endpoint cannot be bound.
    fn handler(self: Arc<Self>) -> Option<EndpointHandler>;
}

/// Validated, immutable snapshot of an endpoint instance
#[derive(Clone)]
pub struct EndpointDescriptor {
    name: String,
    verbs: Vec<Method>,
    routes: Vec<String>,
    allow_anonymous: bool,
    policies: Vec<String>,
    roles: Vec<String>,
    permissions: Vec<String>,
    allow_any_permission: bool,
    handler: EndpointHandler,
    // Keeps the instance alive for as long as its bindings exist.
    _instance: Arc<dyn Endpoint>,
}

impl EndpointDescriptor {
    /// Read and validate an endpoint instance.
    ///
    /// Set-valued fields are de-duplicated keeping first-seen order.
    ///
    /// # Errors
    /// Returns a [`ConfigurationIssue`] when verbs or routes are empty or malformed,
    /// or when the endpoint exposes no handler.
    pub fn read(
        name: impl Into<String>,
        instance: Arc<dyn Endpoint>,
    ) -> Result<Self, ConfigurationIssue> {
        let verbs = dedup(instance.verbs());
        if verbs.is_empty() {
            return Err(ConfigurationIssue::EmptyVerbs);
        }
        if let Some(verb) = verbs
            .iter()
            .find(|v| MethodFilter::try_from((*v).clone()).is_err())
        {
            return Err(ConfigurationIssue::UnsupportedVerb(verb.to_string()));
        }

        let routes = dedup(instance.routes());
        if routes.is_empty() {
            return Err(ConfigurationIssue::EmptyRoutes);
        }
        for route in &routes {
            validate_route(route)?;
        }

        let handler = Arc::clone(&instance)
            .handler()
            .ok_or(ConfigurationIssue::MissingHandler)?;

        Ok(Self {
            name: name.into(),
            verbs,
            routes,
            allow_anonymous: instance.allow_anonymous(),
            policies: dedup(instance.policies()),
            roles: dedup(instance.roles()),
            permissions: dedup(instance.permissions()),
            allow_any_permission: instance.allow_any_permission(),
            handler,
            _instance: instance,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn verbs(&self) -> &[Method] {
        &self.verbs
    }

    #[must_use]
    pub fn routes(&self) -> &[String] {
        &self.routes
    }

    #[must_use]
    pub fn allow_anonymous(&self) -> bool {
        self.allow_anonymous
    }

    #[must_use]
    pub fn policies(&self) -> &[String] {
        &self.policies
    }

    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    #[must_use]
    pub fn allow_any_permission(&self) -> bool {
        self.allow_any_permission
    }

    #[must_use]
    pub fn handler(&self) -> &EndpointHandler {
        &self.handler
    }
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("name", &self.name)
            .field("verbs", &self.verbs)
            .field("routes", &self.routes)
            .field("allow_anonymous", &self.allow_anonymous)
            .field("policies", &self.policies)
            .field("roles", &self.roles)
            .field("permissions", &self.permissions)
            .field("allow_any_permission", &self.allow_any_permission)
            .finish_non_exhaustive()
    }
}

/// Routes must be absolute and use `{param}` placeholders; the legacy `:param` and
/// bare `*rest` segment syntax is rejected.
fn validate_route(route: &str) -> Result<(), ConfigurationIssue> {
    if !route.starts_with('/') {
        return Err(ConfigurationIssue::InvalidRoute(route.to_owned()));
    }
    if route
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(ConfigurationIssue::InvalidRoute(route.to_owned()));
    }
    Ok(())
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    struct Probe {
        verbs: Vec<Method>,
        routes: Vec<&'static str>,
        with_handler: bool,
    }

    impl Endpoint for Probe {
        fn verbs(&self) -> Vec<Method> {
            self.verbs.clone()
        }

        fn routes(&self) -> Vec<String> {
            self.routes.iter().map(|r| (*r).to_owned()).collect()
        }

        fn roles(&self) -> Vec<String> {
            vec!["admin".to_owned(), "admin".to_owned(), "ops".to_owned()]
        }

        fn handler(self: Arc<Self>) -> Option<EndpointHandler> {
            self.with_handler
                .then(|| EndpointHandler::new(|_req: Request| async { "ok" }))
        }
    }

    fn probe(verbs: Vec<Method>, routes: Vec<&'static str>, with_handler: bool) -> Arc<dyn Endpoint> {
        Arc::new(Probe {
            verbs,
            routes,
            with_handler,
        })
    }

    #[test]
    fn test_read_valid_descriptor() {
        let descriptor = EndpointDescriptor::read(
            "probe",
            probe(vec![Method::GET, Method::GET, Method::POST], vec!["/a", "/b/{id}"], true),
        )
        .unwrap();

        assert_eq!(descriptor.name(), "probe");
        assert_eq!(descriptor.verbs(), &[Method::GET, Method::POST]);
        assert_eq!(descriptor.routes(), &["/a".to_owned(), "/b/{id}".to_owned()]);
        assert_eq!(descriptor.roles(), &["admin".to_owned(), "ops".to_owned()]);
        assert!(!descriptor.allow_anonymous());
        assert!(!descriptor.allow_any_permission());
    }

    #[test]
    fn test_empty_verbs_rejected() {
        let err = EndpointDescriptor::read("p", probe(vec![], vec!["/a"], true)).unwrap_err();
        assert_eq!(err, ConfigurationIssue::EmptyVerbs);
    }

    #[test]
    fn test_empty_routes_rejected() {
        let err = EndpointDescriptor::read("p", probe(vec![Method::GET], vec![], true)).unwrap_err();
        assert_eq!(err, ConfigurationIssue::EmptyRoutes);
    }

    #[test]
    fn test_missing_handler_rejected() {
        let err =
            EndpointDescriptor::read("p", probe(vec![Method::GET], vec!["/a"], false)).unwrap_err();
        assert_eq!(err, ConfigurationIssue::MissingHandler);
    }

    #[test]
    fn test_malformed_routes_rejected() {
        for route in ["orders", "/orders/:id", "/files/*rest"] {
            let err = EndpointDescriptor::read("p", probe(vec![Method::GET], vec![route], true))
                .unwrap_err();
            assert_eq!(err, ConfigurationIssue::InvalidRoute(route.to_owned()));
        }
    }

    #[test]
    fn test_extension_verb_rejected() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let err = EndpointDescriptor::read("p", probe(vec![purge], vec!["/a"], true)).unwrap_err();
        assert_eq!(err, ConfigurationIssue::UnsupportedVerb("PURGE".to_owned()));
    }

    #[tokio::test]
    async fn test_handler_with_state_shares_instance() {
        struct Counter(std::sync::atomic::AtomicUsize);

        let state = Arc::new(Counter(std::sync::atomic::AtomicUsize::new(0)));
        let handler = EndpointHandler::with_state(Arc::clone(&state), |c: Arc<Counter>, _req| async move {
            c.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            "done"
        });

        let request = || Request::builder().body(axum::body::Body::empty()).unwrap();
        handler.call(request()).await;
        handler.clone().call(request()).await;
        assert_eq!(state.0.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
