//! Request logging middleware.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use taskflow_core::exception::Result;

use crate::{Handler, Middleware, Request, Response};

/// Logs method, path, status and elapsed time of every request.
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Instant::now();
		let method = request.method.clone();
		let path = request.path().to_string();

		let result = next.handle(request).await;
		let elapsed_ms = start.elapsed().as_millis() as u64;

		match &result {
			Ok(response) => {
				tracing::info!(
					%method,
					%path,
					status = response.status.as_u16(),
					elapsed_ms,
					"request completed"
				);
			}
			Err(err) => {
				tracing::info!(
					%method,
					%path,
					status = err.status_code(),
					elapsed_ms,
					error = %err,
					"request failed"
				);
			}
		}

		result
	}
}
