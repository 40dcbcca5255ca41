//! Error handling module for the attendance service.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const CREDENTIAL_NOT_FOUND: &str = "CREDENTIAL_NOT_FOUND";
    pub const CONFIGURATION_MISSING: &str = "CONFIGURATION_MISSING";
    pub const TENANT_REQUIRED: &str = "TENANT_REQUIRED";
    pub const INVALID_IDENTIFIER_FORMAT: &str = "INVALID_IDENTIFIER_FORMAT";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// No stored credential for the tenant
    CredentialNotFound(String),
    /// No stored class/attendance database pair for the tenant
    ConfigurationMissing(String),
    /// Multi-tenant store used without a tenant id
    TenantRequired,
    /// Setup input contained no database identifier
    InvalidIdentifierFormat(String),
    /// Authentication required
    Unauthorized(String),
    /// Bad request
    BadRequest(String),
    /// Notion rejected or failed a call we cannot degrade around
    Upstream(String),
    /// Invalid process configuration
    Config(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::CredentialNotFound(_) => StatusCode::UNAUTHORIZED,
            AppError::ConfigurationMissing(_) => StatusCode::BAD_REQUEST,
            AppError::TenantRequired => StatusCode::BAD_REQUEST,
            AppError::InvalidIdentifierFormat(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::CredentialNotFound(_) => codes::CREDENTIAL_NOT_FOUND,
            AppError::ConfigurationMissing(_) => codes::CONFIGURATION_MISSING,
            AppError::TenantRequired => codes::TENANT_REQUIRED,
            AppError::InvalidIdentifierFormat(_) => codes::INVALID_IDENTIFIER_FORMAT,
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::CredentialNotFound(tenant) => format!(
                "No Notion credential stored for user '{}'. Connect the workspace via /auth first.",
                tenant
            ),
            AppError::ConfigurationMissing(tenant) => format!(
                "Class and attendance databases are not configured for user '{}'. Complete the one-time setup at {}",
                tenant,
                crate::api::tenant_link("/setup", tenant)
            ),
            AppError::TenantRequired => {
                "The user_id query parameter is required in multi-tenant mode".to_string()
            }
            AppError::InvalidIdentifierFormat(input) => format!(
                "Could not find a 32-character database id in '{}'",
                input
            ),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Upstream(msg) => msg.clone(),
            AppError::Config(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", err);
        AppError::Internal(format!("I/O error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Notion request error: {:?}", err);
        AppError::Upstream(format!("Notion request failed: {}", err))
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.error_code().to_string(),
            message: error.message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self.message());
        }
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}

/// Wrapper rendering an error as an HTML page for browser-facing routes.
pub struct HtmlError(pub AppError);

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        HtmlError(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.0.error_code(), "{}", self.0.message());
        }

        let mut body = format!(
            "<h2>Attendance run failed</h2><p>{}</p>",
            crate::api::escape_html(&self.0.message())
        );
        if let AppError::ConfigurationMissing(tenant) = &self.0 {
            body.push_str(&format!(
                "<p><a href=\"{}\">Open setup</a></p>",
                crate::api::escape_html(&crate::api::tenant_link("/setup", tenant))
            ));
        }

        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_errors_map_to_client_statuses() {
        let missing = AppError::ConfigurationMissing("u1".to_string());
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert!(missing.message().contains("/setup?user_id=u1"));

        let no_token = AppError::CredentialNotFound("u1".to_string());
        assert_eq!(no_token.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(no_token.error_code(), codes::CREDENTIAL_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_setup_link_encodes_tenant() {
        let response =
            HtmlError(AppError::ConfigurationMissing("a b&c".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"<a href="/setup?user_id=a%20b%26c">"#));

        let message = AppError::ConfigurationMissing("a b&c".to_string()).message();
        assert!(message.contains("/setup?user_id=a%20b%26c"));
    }

    #[test]
    fn test_error_response_envelope() {
        let body = ErrorResponse::new(&AppError::InvalidIdentifierFormat("abc".to_string()));
        assert_eq!(body.status, "error");
        assert_eq!(body.code, "INVALID_IDENTIFIER_FORMAT");
        assert!(body.message.contains("abc"));
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::Upstream("boom".to_string());
        assert_eq!(err.to_string(), "UPSTREAM_ERROR: boom");
    }
}
