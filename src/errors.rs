use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse
};
use jsonwebtoken::errors::{ErrorKind, Error as JwtError};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

pub const RELAY_NOT_CONFIGURED: &str = "Email service is not configured. Please contact via social links.";
pub const RELAY_DELIVERY_FAILED: &str = "Failed to send message. Please try again or contact via social links.";

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    NotFound(String),
    MissingDocument { message: String, redirect: String },
    StoreUnavailable(String),
    ConfigMissing(String),
    RelayFailed(String),
    UnauthorizedAccess,
    ForbiddenAccess,
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::MissingDocument { message, .. } => write!(f, "Not found: {}", message),
            AppError::StoreUnavailable(msg) => write!(f, "Content store unavailable: {}", msg),
            AppError::ConfigMissing(msg) => write!(f, "{}", msg),
            AppError::RelayFailed(msg) => write!(f, "{}", msg),
            AppError::UnauthorizedAccess => write!(f, "Unauthorized access"),
            AppError::ForbiddenAccess => write!(f, "Forbidden access"),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());

        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            AppError::MissingDocument { redirect, .. } => {
                builder.insert_header((header::LOCATION, redirect.as_str()));
                serde_json::json!({
                    "error": self.to_string(),
                    "redirect": redirect
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingDocument { .. } => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ConfigMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RelayFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenAccess => StatusCode::FORBIDDEN,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }

    /// Turns a store-level `NotFound` into a response that sends the caller
    /// back to the list view.
    pub fn redirect_missing(self, message: &str, redirect: &str) -> Self {
        match self {
            AppError::NotFound(_) => AppError::MissingDocument {
                message: message.to_string(),
                redirect: redirect.to_string(),
            },
            other => other,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Document not found".into()),
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StoreError::Malformed(msg) => AppError::InternalError(format!("Malformed document: {}", msg)),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        tracing::warn!("Contact relay failed: {}", err);
        AppError::RelayFailed(RELAY_DELIVERY_FAILED.to_string())
    }
}

#[derive(Debug, Display, PartialEq)]
pub enum AuthError {
    #[display("Invalid token")]
    InvalidToken,

    #[display("Invalid email or password")]
    WrongCredentials,

    #[display("Too many attempts. Please try again later.")]
    TooManyAttempts,

    #[display("Token creation error")]
    TokenCreation,

    #[display("Token expired")]
    TokenExpired,

    #[display("Token revoked")]
    TokenRevoked,

    #[display("Missing credentials")]
    MissingCredentials,

    #[display("OAuth provider rejected the sign-in: {_0}")]
    OAuthRejected(String),

    #[display("Forbidden: {_0}")]
    Forbidden(String),
}

impl AuthError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let error_message = match self {
            AuthError::TokenExpired => "Token has expired".to_string(),
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({"error": error_message}))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::OAuthRejected(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(_: ValidationErrors) -> Self {
        AuthError::MissingCredentials
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password parameters: {_0}")]
    InvalidParameters(String),

    #[display("Password hashing failed: {_0}")]
    HashingError(String),

    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

/// Failures reported by a [`crate::repositories::document_store::DocumentStore`].
#[derive(Debug, Display, Clone, PartialEq)]
pub enum StoreError {
    #[display("Document not found")]
    NotFound,

    #[display("Store unavailable: {_0}")]
    Unavailable(String),

    #[display("Malformed document: {_0}")]
    Malformed(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Malformed(err.to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

#[derive(Debug, Display)]
pub enum RelayError {
    #[display("Relay request failed: {_0}")]
    Transport(String),

    #[display("Relay rejected the message ({_0}): {_1}")]
    Rejected(u16, String),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Transport(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn missing_document_carries_redirect() {
        let err = AppError::NotFound("gone".into()).redirect_missing("Post not found", "/blog");
        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/blog");

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["redirect"], "/blog");
        assert_eq!(json["error"], "Not found: Post not found");
    }

    #[actix_rt::test]
    async fn auth_errors_render_json_with_status() {
        let response = AuthError::TooManyAttempts.to_http_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Too many attempts. Please try again later.");

        assert_eq!(AuthError::WrongCredentials.to_http_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn redirect_missing_keeps_other_errors() {
        let err = AppError::StoreUnavailable("down".into()).redirect_missing("Post not found", "/blog");
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        assert!(matches!(AppError::from(StoreError::NotFound), AppError::NotFound(_)));
        assert!(matches!(
            AppError::from(StoreError::Unavailable("timeout".into())),
            AppError::StoreUnavailable(_)
        ));
    }

    #[test]
    fn config_missing_is_service_unavailable() {
        let err = AppError::ConfigMissing(RELAY_NOT_CONFIGURED.into());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), RELAY_NOT_CONFIGURED);
    }

    #[test]
    fn throttled_login_is_429() {
        assert_eq!(AuthError::TooManyAttempts.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AuthError::WrongCredentials.to_string(), "Invalid email or password");
    }
}
