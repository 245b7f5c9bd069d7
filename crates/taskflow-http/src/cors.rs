//! CORS middleware.

use std::sync::Arc;

use async_trait::async_trait;
use hyper::header::{self, HeaderValue};
use hyper::Method;
use taskflow_core::exception::Result;

use crate::{Handler, Middleware, Request, Response};

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
	pub allow_origin: String,
	pub allow_methods: Vec<String>,
	pub allow_headers: Vec<String>,
	pub allow_credentials: bool,
	pub max_age: Option<u64>,
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allow_origin: "*".to_string(),
			allow_methods: ["GET", "POST", "PATCH", "DELETE", "OPTIONS"]
				.into_iter()
				.map(String::from)
				.collect(),
			allow_headers: ["Authorization", "Content-Type"]
				.into_iter()
				.map(String::from)
				.collect(),
			allow_credentials: false,
			max_age: Some(3600),
		}
	}
}

/// Answers preflight requests and decorates every other response.
pub struct CorsMiddleware {
	config: CorsConfig,
}

impl CorsMiddleware {
	pub fn new(config: CorsConfig) -> Self {
		Self { config }
	}

	/// Allow a single origin with default methods and headers.
	pub fn for_origin(origin: impl Into<String>) -> Self {
		Self::new(CorsConfig {
			allow_origin: origin.into(),
			// Credentials cannot be combined with the wildcard origin
			allow_credentials: true,
			..CorsConfig::default()
		})
	}

	fn decorate(&self, response: &mut Response) {
		response.headers.insert(
			header::ACCESS_CONTROL_ALLOW_ORIGIN,
			HeaderValue::from_str(&self.config.allow_origin)
				.unwrap_or_else(|_| HeaderValue::from_static("*")),
		);
		if self.config.allow_credentials && self.config.allow_origin != "*" {
			response.headers.insert(
				header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
				HeaderValue::from_static("true"),
			);
		}
	}
}

#[async_trait]
impl Middleware for CorsMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if request.method == Method::OPTIONS {
			let mut response = Response::no_content()
				.with_header(
					"access-control-allow-methods",
					&self.config.allow_methods.join(", "),
				)
				.with_header(
					"access-control-allow-headers",
					&self.config.allow_headers.join(", "),
				);
			if let Some(max_age) = self.config.max_age {
				response = response.with_header("access-control-max-age", &max_age.to_string());
			}
			self.decorate(&mut response);
			return Ok(response);
		}

		let mut response = next.handle(request).await?;
		self.decorate(&mut response);
		Ok(response)
	}
}
