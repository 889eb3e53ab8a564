//! API error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::CaredeskError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Required field absent or body unreadable (400).
    Missing,
    /// No such user (404).
    UserNotFound,
    /// Account locked (423).
    Locked,
    /// Wrong password (401).
    InvalidCredentials,
    /// No one-time code on file (400).
    NoOtp,
    /// Code or token past its expiry (410).
    Expired,
    /// Wrong one-time code (401).
    Invalid,
    /// Unknown reset token (400).
    InvalidToken,
    /// Password policy violation (422).
    WeakPassword,
    /// Malformed reservation (422).
    InvalidReservation,
    /// Unknown resource (404).
    NotFound,
    /// Reservation overlap (409).
    Conflict,
    /// Missing or wrong admin key (401).
    Unauthorized,
    /// Too many requests (429).
    RateLimited,
    /// Internal server error (500).
    Internal,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Missing | ErrorCode::NoOtp | ErrorCode::InvalidToken => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::UserNotFound | ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Locked => StatusCode::LOCKED,
            ErrorCode::InvalidCredentials | ErrorCode::Invalid | ErrorCode::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            ErrorCode::Expired => StatusCode::GONE,
            ErrorCode::WeakPassword | ErrorCode::InvalidReservation => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure body: `{"ok": false, "error": <code>, ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Always false.
    pub ok: bool,
    /// Error code.
    pub error: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// When a lockout lifts (epoch milliseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<i64>,
    /// Reservation that caused a conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts_with: Option<String>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    locked_until: Option<i64>,
    conflicts_with: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            locked_until: None,
            conflicts_with: None,
        }
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Create a missing-field error.
    pub fn missing(field: &str) -> Self {
        Self::new(ErrorCode::Missing, format!("missing required field: {field}"))
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            ok: false,
            error: self.code,
            message: self.message,
            locked_until: self.locked_until,
            conflicts_with: self.conflicts_with,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<CaredeskError> for ApiError {
    fn from(err: CaredeskError) -> Self {
        let message = err.to_string();
        match err {
            CaredeskError::Missing(_) => ApiError::new(ErrorCode::Missing, message),
            CaredeskError::UserNotFound => ApiError::new(ErrorCode::UserNotFound, message),
            CaredeskError::Locked { until } => ApiError {
                locked_until: Some(until.timestamp_millis()),
                ..ApiError::new(ErrorCode::Locked, message)
            },
            CaredeskError::InvalidCredentials => {
                ApiError::new(ErrorCode::InvalidCredentials, message)
            }
            CaredeskError::NoOtp => ApiError::new(ErrorCode::NoOtp, message),
            CaredeskError::Expired => ApiError::new(ErrorCode::Expired, message),
            CaredeskError::Invalid => ApiError::new(ErrorCode::Invalid, message),
            CaredeskError::InvalidToken => ApiError::new(ErrorCode::InvalidToken, message),
            CaredeskError::WeakPassword(_) => ApiError::new(ErrorCode::WeakPassword, message),
            CaredeskError::InvalidReservation(_) => {
                ApiError::new(ErrorCode::InvalidReservation, message)
            }
            CaredeskError::NotFound(_) => ApiError::new(ErrorCode::NotFound, message),
            CaredeskError::Conflict { with } => ApiError {
                conflicts_with: Some(with),
                ..ApiError::new(ErrorCode::Conflict, message)
            },
            CaredeskError::CorruptStore { .. }
            | CaredeskError::Serialization(_)
            | CaredeskError::Io(_)
            | CaredeskError::Hash(_)
            | CaredeskError::Config(_) => {
                tracing::error!("Internal error: {}", message);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::new(ErrorCode::Missing, rejection.body_text())
    }
}

impl ApiError {
    /// Map a rejected reservation body.
    ///
    /// Absent fields stay `missing`; values that are present but unreadable,
    /// such as a timestamp with an offset, are `invalid_reservation`.
    pub fn reservation_body(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        if matches!(rejection, JsonRejection::JsonDataError(_))
            && !message.contains("missing field")
        {
            tracing::debug!(error = %message, "Unreadable reservation");
            return ApiError::new(ErrorCode::InvalidReservation, message);
        }
        rejection.into()
    }
}
