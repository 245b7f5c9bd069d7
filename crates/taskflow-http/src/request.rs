//! Incoming HTTP request.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use hyper::http::Extensions;
use hyper::{HeaderMap, Method, Uri, Version};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use taskflow_core::exception::{Error, Result};

/// HTTP request as seen by handlers and middleware.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub remote_addr: Option<SocketAddr>,
	/// Typed values attached by middleware (e.g. the authenticated caller).
	pub extensions: Extensions,
	path_params: HashMap<String, String>,
}

impl Request {
	/// Create a request from its parts.
	///
	/// # Examples
	///
	/// ```
	/// use bytes::Bytes;
	/// use hyper::{HeaderMap, Method, Uri, Version};
	/// use taskflow_http::Request;
	///
	/// let request = Request::new(
	///     Method::GET,
	///     Uri::from_static("/api/tasks?page=2"),
	///     Version::HTTP_11,
	///     HeaderMap::new(),
	///     Bytes::new(),
	/// );
	/// assert_eq!(request.path(), "/api/tasks");
	/// ```
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			remote_addr: None,
			extensions: Extensions::new(),
			path_params: HashMap::new(),
		}
	}

	/// Start building a request.
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Get the request path
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Path parameter captured by the router, already percent-decoded.
	pub fn path_param(&self, key: &str) -> Option<&str> {
		self.path_params.get(key).map(String::as_str)
	}

	/// Path parameter that the matched route is known to declare.
	pub fn param(&self, key: &str) -> Result<&str> {
		self.path_param(key)
			.ok_or_else(|| Error::BadRequest(format!("Missing path parameter: {}", key)))
	}

	/// Set a path parameter (used by the router for `{name}` segments)
	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let value = value.into();
		let decoded = percent_decode_str(&value).decode_utf8_lossy().into_owned();
		self.path_params.insert(key.into(), decoded);
	}

	/// Deserialize the query string into `T`.
	///
	/// # Examples
	///
	/// ```
	/// use hyper::Method;
	/// use serde::Deserialize;
	/// use taskflow_http::Request;
	///
	/// #[derive(Deserialize)]
	/// struct Filter {
	///     page: Option<i64>,
	///     search: Option<String>,
	/// }
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/api/tasks?page=2&search=login%20page")
	///     .build()
	///     .unwrap();
	///
	/// let filter: Filter = request.query().unwrap();
	/// assert_eq!(filter.page, Some(2));
	/// assert_eq!(filter.search.as_deref(), Some("login page"));
	/// ```
	pub fn query<T: DeserializeOwned>(&self) -> Result<T> {
		serde_urlencoded::from_str(self.uri.query().unwrap_or(""))
			.map_err(|e| Error::BadRequest(format!("Invalid query string: {}", e)))
	}

	/// Deserialize the JSON body into `T`.
	///
	/// An empty body is treated as `{}` so that all-optional payloads can be
	/// sent without a body.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
		if self.body.is_empty() {
			return Ok(serde_json::from_slice(b"{}")?);
		}
		Ok(serde_json::from_slice(&self.body)?)
	}

	/// Bearer token from the `Authorization` header.
	pub fn bearer_token(&self) -> Option<&str> {
		self.headers
			.get(hyper::header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("Bearer "))
			.map(str::trim)
			.filter(|token| !token.is_empty())
	}
}

/// Builder for [`Request`], mostly used by tests.
#[derive(Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			hyper::header::HeaderName::from_bytes(name.as_bytes()),
			hyper::header::HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Serialize `value` as the JSON body and set the content type.
	pub fn json<T: serde::Serialize>(self, value: &T) -> Result<Self> {
		let body = serde_json::to_vec(value)?;
		Ok(self.header("content-type", "application/json").body(body))
	}

	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.unwrap_or_else(|| "/".to_string())
			.parse()
			.map_err(|e| Error::BadRequest(format!("Invalid URI: {}", e)))?;
		Ok(Request::new(
			self.method.unwrap_or(Method::GET),
			uri,
			Version::HTTP_11,
			self.headers,
			self.body,
		))
	}
}
