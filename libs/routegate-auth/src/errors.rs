use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required: missing or invalid token")]
    Unauthenticated,

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Unknown authorization policy: {0}")]
    UnknownPolicy(String),
}

/// Errors raised while registering authorization policies
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("authorization policy '{0}' is already registered")]
    Duplicate(String),

    #[error("authorization policy name must not be empty")]
    EmptyName,
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::response::Json;
        use serde_json::json;

        let (status, message) = match self {
            AuthError::Unauthenticated | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AuthError::UnknownPolicy(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
