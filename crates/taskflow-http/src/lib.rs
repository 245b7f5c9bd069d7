//! # TaskFlow HTTP
//!
//! The HTTP plumbing under the TaskFlow API: [`Request`] and [`Response`]
//! types, the [`Handler`]/[`Middleware`] traits, a path-pattern [`Router`]
//! and an [`HttpServer`] on hyper's HTTP/1 connection driver.
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskflow_http::{HttpServer, LoggingMiddleware, Request, Response, Router, ShutdownCoordinator, view};
//!
//! async fn health(_request: Request, _state: ()) -> taskflow_core::Result<Response> {
//!     Ok(Response::ok().with_body("ok"))
//! }
//!
//! # async fn run() -> std::io::Result<()> {
//! let router = Router::new().get("/health", view((), health));
//! let coordinator = ShutdownCoordinator::new();
//! HttpServer::new(Arc::new(router))
//!     .with_middleware(Arc::new(LoggingMiddleware::new()))
//!     .listen_with_shutdown("127.0.0.1:3000".parse().unwrap(), coordinator)
//!     .await
//! # }
//! ```

pub mod cors;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use cors::{CorsConfig, CorsMiddleware};
pub use logging::LoggingMiddleware;
pub use middleware::{Handler, Middleware, MiddlewareChain, ViewHandler, view};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use router::{PathPattern, Router};
pub use server::{HttpServer, ShutdownCoordinator, dispatch, shutdown_signal};

pub use hyper::{Method, StatusCode};
