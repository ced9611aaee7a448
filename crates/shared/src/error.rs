use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message surfaced when a failed response carries no usable `error` field.
pub const GENERIC_API_FAILURE: &str = "API request failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorCode::Validation,
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            500..=599 => ErrorCode::Internal,
            _ => ErrorCode::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            message: message.into(),
        }
    }

    /// Builds the error from the `error` field of a failure envelope, if any.
    pub fn from_envelope(status: u16, error: Option<String>) -> Self {
        let message = error
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_API_FAILURE.to_string());
        Self::new(status, message)
    }

    pub fn requires_reauth(&self) -> bool {
        self.code == ErrorCode::Unauthorized || is_auth_failure_message(&self.message)
    }
}

/// Message heuristic for auth failures that arrive without a status.
pub fn is_auth_failure_message(message: &str) -> bool {
    message.contains("Unauthorized") || message.contains("token")
}
