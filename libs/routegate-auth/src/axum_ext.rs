//! Axum extractor and per-route guard middleware

use crate::{
    authorizer::Authorizer, errors::AuthError, traits::TokenValidator, types::AuthRequirement,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use routegate_security::Principal;
use std::convert::Infallible;
use std::sync::Arc;

/// Extractor for the request principal.
///
/// Yields the anonymous principal when no guard ran for the route
/// (authorization disabled).
#[derive(Debug, Clone)]
pub struct Authn(pub Principal);

impl<S> FromRequestParts<S> for Authn
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Authn(
            parts
                .extensions
                .get::<Principal>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

/// Authentication and authorization collaborators shared by every guarded route
#[derive(Clone)]
pub struct GuardContext {
    validator: Arc<dyn TokenValidator>,
    authorizer: Authorizer,
}

impl GuardContext {
    pub fn new(validator: Arc<dyn TokenValidator>, authorizer: Authorizer) -> Self {
        Self {
            validator,
            authorizer,
        }
    }
}

/// State of the guard attached to one route binding
#[derive(Clone)]
pub struct RouteGuard {
    requirement: Arc<AuthRequirement>,
    ctx: GuardContext,
}

impl RouteGuard {
    pub fn new(requirement: AuthRequirement, ctx: GuardContext) -> Self {
        Self {
            requirement: Arc::new(requirement),
            ctx,
        }
    }
}

/// Per-route guard middleware
///
/// This middleware:
/// 1. Skips CORS preflight requests
/// 2. `Unconstrained`: passes the request through untouched
/// 3. `Anonymous`: attaches the token's principal if a valid token is present,
///    otherwise the anonymous principal; never rejects
/// 4. `Authorized`: requires a valid bearer token (401 otherwise), evaluates the
///    policies and roles (403 on failure) and attaches the principal
pub async fn guard_route(
    State(RouteGuard { requirement, ctx }): State<RouteGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    match requirement.as_ref() {
        AuthRequirement::Unconstrained => next.run(request).await,
        AuthRequirement::Anonymous => {
            let principal = match extract_bearer_token(request.headers()) {
                Some(token) => match ctx.validator.validate(token).await {
                    Ok(principal) => principal,
                    Err(err) => {
                        tracing::debug!("Anonymous route: ignoring invalid token: {err}");
                        Principal::anonymous()
                    }
                },
                None => Principal::anonymous(),
            };
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        AuthRequirement::Authorized(access) => {
            let Some(token) = extract_bearer_token(request.headers()) else {
                return AuthError::Unauthenticated.into_response();
            };

            let principal = match ctx.validator.validate(token).await {
                Ok(principal) => principal,
                Err(err) => return err.into_response(),
            };

            if let Err(err) = ctx.authorizer.authorize(&principal, access) {
                return err.into_response();
            }

            request.extensions_mut().insert(principal);
            next.run(request).await
        }
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
