//! Outgoing HTTP response.

use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;
use taskflow_core::exception::{Error, Result, now_rfc3339};

/// HTTP Response representation
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

/// Success envelope wrapped around every JSON payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T: Serialize> {
	status_code: u16,
	message: &'static str,
	data: &'a T,
	timestamp: String,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use hyper::StatusCode;
	/// use taskflow_http::Response;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Set the response body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a custom header to the response
	///
	/// Invalid header names or values are ignored.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = hyper::header::HeaderName::from_bytes(name.as_bytes()) {
			if let Ok(header_value) = hyper::header::HeaderValue::from_str(value) {
				self.headers.insert(header_name, header_value);
			}
		}
		self
	}

	/// Set the response body to JSON and add appropriate Content-Type header
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
		let json = serde_json::to_vec(data)
			.map_err(|e| Error::Internal(format!("failed to serialize response: {}", e)))?;
		self.body = Bytes::from(json);
		self.headers.insert(
			hyper::header::CONTENT_TYPE,
			hyper::header::HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	/// Wrap `data` in the success envelope
	/// `{ statusCode, message: "Success", data, timestamp }`.
	///
	/// # Examples
	///
	/// ```
	/// use hyper::StatusCode;
	/// use serde_json::json;
	/// use taskflow_http::Response;
	///
	/// let response = Response::json(StatusCode::CREATED, &json!({"id": "t1"})).unwrap();
	/// let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
	///
	/// assert_eq!(body["statusCode"], 201);
	/// assert_eq!(body["message"], "Success");
	/// assert_eq!(body["data"]["id"], "t1");
	/// ```
	pub fn json<T: Serialize>(status: StatusCode, data: &T) -> Result<Self> {
		let envelope = Envelope {
			status_code: status.as_u16(),
			message: "Success",
			data,
			timestamp: now_rfc3339(),
		};
		Self::new(status).with_json(&envelope)
	}

	/// Render an error as the JSON error envelope for `path`.
	pub fn from_error(error: &Error, path: &str) -> Self {
		let status =
			StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		Response::new(status)
			.with_json(&error.to_body(path))
			.unwrap_or_else(|_| Response::internal_server_error())
	}
}
