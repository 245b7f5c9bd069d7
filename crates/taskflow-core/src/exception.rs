//! Error taxonomy shared by every TaskFlow service.
//!
//! Services return [`Result`] and the HTTP layer turns an [`Error`] into the
//! JSON error envelope described by [`ErrorBody`]:
//!
//! ```json
//! {
//!   "statusCode": 403,
//!   "message": "Editors can only change task status",
//!   "error": "Forbidden",
//!   "timestamp": "2024-01-01T00:00:00.000Z",
//!   "path": "/api/tasks/123"
//! }
//! ```

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Application error.
///
/// Each variant maps onto exactly one HTTP status class. The message is
/// surfaced verbatim to the caller, except for [`Error::Internal`] whose
/// detail is only logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// Referenced entity does not exist.
	#[error("{0}")]
	NotFound(String),

	/// Caller is authenticated but lacks the role, ownership or authorship
	/// required for the action.
	#[error("{0}")]
	Forbidden(String),

	/// Malformed or inconsistent input (password mismatch, bad enum value).
	#[error("{0}")]
	BadRequest(String),

	/// Field-level validation failures.
	#[error("Validation failed: {}", .0.join(", "))]
	Validation(Vec<String>),

	/// Duplicate unique value.
	#[error("{0}")]
	Conflict(String),

	/// Missing, invalid or expired credential, or deactivated account.
	#[error("{0}")]
	Unauthorized(String),

	/// Unexpected failure in the primary read/write path.
	#[error("Internal error: {0}")]
	Internal(String),
}

impl Error {
	/// HTTP status code for this error.
	///
	/// # Examples
	///
	/// ```
	/// use taskflow_core::exception::Error;
	///
	/// assert_eq!(Error::NotFound("Task not found".into()).status_code(), 404);
	/// assert_eq!(Error::Forbidden("nope".into()).status_code(), 403);
	/// ```
	pub fn status_code(&self) -> u16 {
		match self {
			Error::NotFound(_) => 404,
			Error::Forbidden(_) => 403,
			Error::BadRequest(_) | Error::Validation(_) => 400,
			Error::Conflict(_) => 409,
			Error::Unauthorized(_) => 401,
			Error::Internal(_) => 500,
		}
	}

	/// Reason phrase used as the `error` label of the envelope.
	pub fn kind(&self) -> &'static str {
		match self {
			Error::NotFound(_) => "Not Found",
			Error::Forbidden(_) => "Forbidden",
			Error::BadRequest(_) | Error::Validation(_) => "Bad Request",
			Error::Conflict(_) => "Conflict",
			Error::Unauthorized(_) => "Unauthorized",
			Error::Internal(_) => "Internal Server Error",
		}
	}

	/// Message as seen by API clients.
	pub fn public_message(&self) -> ErrorMessage {
		match self {
			Error::Validation(messages) => ErrorMessage::Many(messages.clone()),
			Error::Internal(_) => ErrorMessage::Single("Internal server error".to_string()),
			Error::NotFound(m)
			| Error::Forbidden(m)
			| Error::BadRequest(m)
			| Error::Conflict(m)
			| Error::Unauthorized(m) => ErrorMessage::Single(m.clone()),
		}
	}

	/// Build the error envelope for a request path.
	///
	/// # Examples
	///
	/// ```
	/// use taskflow_core::exception::Error;
	///
	/// let body = Error::Unauthorized("Invalid credentials".into()).to_body("/api/auth/login");
	/// assert_eq!(body.status_code, 401);
	/// assert_eq!(body.error, "Unauthorized");
	/// assert_eq!(body.path, "/api/auth/login");
	/// ```
	pub fn to_body(&self, path: &str) -> ErrorBody {
		ErrorBody {
			status_code: self.status_code(),
			message: self.public_message(),
			error: self.kind(),
			timestamp: now_rfc3339(),
			path: path.to_string(),
		}
	}
}

/// Either a single message or the list produced by field validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
	Single(String),
	Many(Vec<String>),
}

/// JSON error envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
	pub status_code: u16,
	pub message: ErrorMessage,
	pub error: &'static str,
	pub timestamp: String,
	pub path: String,
}

/// Current time in the envelope's timestamp format.
pub fn now_rfc3339() -> String {
	Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		match err {
			sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
			sqlx::Error::Database(db) if db.is_unique_violation() => {
				Error::Conflict("Resource already exists".to_string())
			}
			sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
				Error::BadRequest("Referenced resource does not exist".to_string())
			}
			other => Error::Internal(other.to_string()),
		}
	}
}

impl From<validator::ValidationErrors> for Error {
	fn from(errors: validator::ValidationErrors) -> Self {
		let mut messages: Vec<String> = errors
			.field_errors()
			.into_iter()
			.flat_map(|(field, errs)| {
				errs.iter().map(move |e| match &e.message {
					Some(message) => message.to_string(),
					None => format!("{} is invalid", field),
				})
			})
			.collect();
		messages.sort();
		Error::Validation(messages)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::BadRequest(format!("Invalid request body: {}", err))
	}
}
