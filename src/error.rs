// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP-facing error: every layer error collapses into one of these, which
/// renders as a status code plus a single human-readable message. Nothing is
/// retried and nothing is logged durably; tracing output is the only trail.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),
    UnknownContentType(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    DatabaseError(String),
    InternalServerError(String),

    // 502 Bad Gateway (object storage and other external services)
    UploadError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownContentType(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UploadError(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::ValidationError(msg)
            | ApiError::UnknownContentType(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::DatabaseError(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::UploadError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::UnknownContentType(_) => "UNKNOWN_CONTENT_TYPE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::UploadError(_) => "UPLOAD_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        })
    }
}

// Static constructors, handler-side ergonomics
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<crate::content::ContentError> for ApiError {
    fn from(err: crate::content::ContentError) -> Self {
        use crate::content::ContentError;
        match err {
            ContentError::UnknownContentType(label) => {
                ApiError::UnknownContentType(format!("Unknown content type: {}", label))
            }
            ContentError::Validation(msg) => ApiError::ValidationError(msg),
            ContentError::NotPermitted(label) => ApiError::Forbidden(format!(
                "Your profile is not allowed to publish {} content",
                label
            )),
            ContentError::NotFound => ApiError::NotFound("Content not found".to_string()),
            ContentError::Store(e) => e.into(),
        }
    }
}

impl From<crate::database::store::StoreError> for ApiError {
    fn from(err: crate::database::store::StoreError) -> Self {
        use crate::database::store::StoreError;
        match err {
            StoreError::ConfigMissing(_) | StoreError::InvalidDatabaseUrl => {
                tracing::error!("database configuration error: {}", err);
                ApiError::service_unavailable("Database not configured")
            }
            // Store failures surface with their message intact.
            other => {
                tracing::error!("database error: {}", other);
                ApiError::DatabaseError(other.to_string())
            }
        }
    }
}

impl From<crate::database::models::profile::ProfileError> for ApiError {
    fn from(err: crate::database::models::profile::ProfileError) -> Self {
        use crate::database::models::profile::ProfileError;
        match err {
            ProfileError::NotFound => ApiError::not_found("Profile not found"),
            ProfileError::OnboardingIncomplete => {
                ApiError::forbidden("Complete onboarding before continuing")
            }
            ProfileError::UnknownRole(role) => {
                ApiError::internal_server_error(format!("Unknown profile role: {}", role))
            }
            ProfileError::Validation(msg) => ApiError::ValidationError(msg),
            ProfileError::Store(e) => e.into(),
        }
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
            AuthError::Token(msg) => ApiError::unauthorized(format!("Invalid token: {}", msg)),
            AuthError::MissingSecret => {
                tracing::error!("JWT secret not configured");
                ApiError::service_unavailable("Authentication not configured")
            }
            AuthError::Hashing(msg) => {
                tracing::error!("password hashing error: {}", msg);
                ApiError::internal_server_error("Could not process credentials")
            }
        }
    }
}

impl From<crate::services::storage::UploadError> for ApiError {
    fn from(err: crate::services::storage::UploadError) -> Self {
        ApiError::UploadError(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentError;

    #[test]
    fn content_errors_map_to_expected_statuses() {
        let unknown: ApiError = ContentError::UnknownContentType("Nonsense".into()).into();
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown.error_code(), "UNKNOWN_CONTENT_TYPE");

        let not_found: ApiError = ContentError::NotFound.into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let forbidden: ApiError = ContentError::NotPermitted("Job").into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn store_errors_keep_their_message() {
        use crate::database::store::StoreError;
        let err: ApiError = StoreError::Query("duplicate key".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("duplicate key"));
    }
}
