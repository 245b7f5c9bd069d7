//! Handler and middleware traits.
//!
//! ## Handler
//!
//! ```rust
//! use async_trait::async_trait;
//! use taskflow_http::{Handler, Request, Response};
//!
//! struct Health;
//!
//! #[async_trait]
//! impl Handler for Health {
//!     async fn handle(&self, _request: Request) -> taskflow_core::Result<Response> {
//!         Ok(Response::ok().with_body("ok"))
//!     }
//! }
//! ```
//!
//! ## Middleware
//!
//! Middleware wraps a handler to add cross-cutting concerns (authentication,
//! CORS, request logging). A chain runs middleware in insertion order.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use taskflow_core::exception::Result;

use crate::{Request, Response};

/// Handler trait for processing requests.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed; the server renders
	/// it as the JSON error envelope.
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing.
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Processes a request, usually by calling `next`.
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Whether this middleware runs for `request`. Defaults to always.
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Middleware chain - composes multiple middleware into a single handler.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	/// Adds a middleware to the chain using builder pattern.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();

		// Wrap from the innermost middleware outwards so the first added runs first
		for middleware in self
			.middlewares
			.iter()
			.rev()
			.filter(|mw| mw.should_continue(&request))
		{
			current = Arc::new(ComposedHandler {
				middleware: middleware.clone(),
				next: current,
			});
		}

		current.handle(request).await
	}
}

struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		let response = self.middleware.process(request, self.next.clone()).await?;
		Ok(response)
	}
}

/// Handler backed by an async function that receives shared state.
///
/// Views are plain `async fn(Request, S) -> Result<Response>`; the state is
/// cloned into every call.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use taskflow_http::{Request, Response, view};
///
/// async fn hello(_request: Request, greeting: Arc<String>) -> taskflow_core::Result<Response> {
///     Ok(Response::ok().with_body(greeting.as_str().to_owned()))
/// }
///
/// let handler = view(Arc::new("hi".to_string()), hello);
/// # let _ = handler;
/// ```
pub struct ViewHandler<S, F> {
	state: S,
	func: F,
}

pub fn view<S, F, Fut>(state: S, func: F) -> ViewHandler<S, F>
where
	S: Clone + Send + Sync + 'static,
	F: Fn(Request, S) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	ViewHandler { state, func }
}

#[async_trait]
impl<S, F, Fut> Handler for ViewHandler<S, F>
where
	S: Clone + Send + Sync + 'static,
	F: Fn(Request, S) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	async fn handle(&self, request: Request) -> Result<Response> {
		(self.func)(request, self.state.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	struct Recorder {
		name: &'static str,
		log: Arc<Mutex<Vec<&'static str>>>,
	}

	#[async_trait]
	impl Middleware for Recorder {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			self.log.lock().unwrap().push(self.name);
			next.handle(request).await
		}
	}

	struct ShortCircuit;

	#[async_trait]
	impl Middleware for ShortCircuit {
		async fn process(&self, _request: Request, _next: Arc<dyn Handler>) -> Result<Response> {
			Ok(Response::no_content())
		}

		fn should_continue(&self, request: &Request) -> bool {
			request.method == hyper::Method::OPTIONS
		}
	}

	async fn ok_view(_request: Request, _state: ()) -> Result<Response> {
		Ok(Response::ok())
	}

	#[rstest]
	#[tokio::test]
	async fn test_middleware_runs_in_insertion_order() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let chain = MiddlewareChain::new(Arc::new(view((), ok_view)))
			.with_middleware(Arc::new(Recorder {
				name: "first",
				log: log.clone(),
			}))
			.with_middleware(Arc::new(Recorder {
				name: "second",
				log: log.clone(),
			}));

		let response = chain.handle(Request::builder().build().unwrap()).await.unwrap();

		assert_eq!(response.status, hyper::StatusCode::OK);
		assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
	}

	#[rstest]
	#[case(hyper::Method::OPTIONS, hyper::StatusCode::NO_CONTENT)]
	#[case(hyper::Method::GET, hyper::StatusCode::OK)]
	#[tokio::test]
	async fn test_conditional_middleware(
		#[case] method: hyper::Method,
		#[case] expected: hyper::StatusCode,
	) {
		let chain = MiddlewareChain::new(Arc::new(view((), ok_view)))
			.with_middleware(Arc::new(ShortCircuit));

		let request = Request::builder().method(method).build().unwrap();
		let response = chain.handle(request).await.unwrap();

		assert_eq!(response.status, expected);
	}
}
