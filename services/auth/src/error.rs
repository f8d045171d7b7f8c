use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid two-factor code")]
    InvalidTwoFactorCode,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,
    #[error("invalid access token")]
    InvalidToken,
    #[error("password does not meet policy")]
    WeakPassword,
    #[error("stored credential is corrupt: {0}")]
    CorruptCredential(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidTwoFactorCode => "INVALID_TWO_FACTOR_CODE",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::CorruptCredential(_) => "CORRUPT_CREDENTIAL",
            Self::Configuration(_) => "CONFIGURATION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidTwoFactorCode
                | Self::SessionExpired
                | Self::InvalidToken
        )
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCredentials
            | Self::InvalidTwoFactorCode
            | Self::SessionExpired
            | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InvalidOrExpiredToken | Self::WeakPassword => StatusCode::BAD_REQUEST,
            Self::CorruptCredential(_) | Self::Configuration(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // 4xx are expected client errors and already recorded by TraceLayer.
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "internal error");
        }
        // Authentication failures share one body so callers cannot tell them apart.
        let body = if self.is_unauthenticated() {
            serde_json::json!({
                "kind": "UNAUTHENTICATED",
                "message": "authentication failed",
            })
        } else if status.is_server_error() {
            serde_json::json!({
                "kind": "INTERNAL",
                "message": "internal error",
            })
        } else {
            serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
            })
        };
        (status, axum::Json(body)).into_response()
    }
}
