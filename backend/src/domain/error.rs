//! Failure payload shared by every provisioning operation.
//!
//! Port failures are folded into an [`ErrorCode`] by the service so
//! presentation collaborators can branch on the category and show the
//! message. Structured `details` carry machine-readable context such as the
//! exhausted username base.

use serde::Serialize;
use serde_json::Value;

/// Failure category of a provisioning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The input cannot be provisioned as given, such as a blank phone.
    InvalidRequest,
    /// No session, or the store or session refused the change.
    Forbidden,
    /// The addressed signup, user, or account does not exist.
    NotFound,
    /// Every username candidate is already taken.
    Conflict,
    /// The store, session, or scope lease could not be reached.
    ServiceUnavailable,
    /// The domain produced something it cannot handle, such as an invalid
    /// store key.
    InternalError,
}

/// Provisioning failure.
///
/// Serialises as `{"code": ..., "message": ..., "details": ...}` with
/// `details` omitted when absent.
///
/// # Examples
/// ```
/// use roster::domain::{Error, ErrorCode};
/// use serde_json::json;
///
/// let err = Error::conflict("username candidates exhausted")
///     .with_details(json!({ "base": "555" }));
/// assert_eq!(err.code(), ErrorCode::Conflict);
/// assert_eq!(err.to_string(), "username candidates exhausted");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Build an error of category `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message describing the failure, including any port error text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context, when attached.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured context.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// [`ErrorCode::InvalidRequest`] error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// [`ErrorCode::Forbidden`] error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// [`ErrorCode::NotFound`] error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// [`ErrorCode::Conflict`] error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// [`ErrorCode::ServiceUnavailable`] error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// [`ErrorCode::InternalError`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}
