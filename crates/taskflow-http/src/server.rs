//! hyper-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::{Handler, Middleware, MiddlewareChain, Request, Response};

/// Fans a single shutdown signal out to the accept loop and every open
/// connection. Late subscribers still observe a shutdown that already
/// happened.
#[derive(Clone)]
pub struct ShutdownCoordinator {
	sender: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownCoordinator {
	fn default() -> Self {
		Self::new()
	}
}

impl ShutdownCoordinator {
	pub fn new() -> Self {
		let (sender, _) = watch::channel(false);
		Self {
			sender: Arc::new(sender),
		}
	}

	/// Ask every subscriber to stop.
	pub fn shutdown(&self) {
		self.sender.send_replace(true);
	}

	pub fn is_shutdown(&self) -> bool {
		*self.sender.borrow()
	}

	/// Resolves once [`ShutdownCoordinator::shutdown`] has been called.
	pub async fn wait(&self) {
		let mut receiver = self.sender.subscribe();
		// The sender lives in self, so the channel cannot close while waiting
		let _ = receiver.wait_for(|stopped| *stopped).await;
	}
}

/// Resolves when the process receives Ctrl-C.
pub async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
}

/// Run `request` through `handler`, rendering errors as the JSON error
/// envelope.
pub async fn dispatch(handler: &dyn Handler, request: Request) -> Response {
	let path = request.path().to_string();
	match handler.handle(request).await {
		Ok(response) => response,
		Err(err) => {
			if err.status_code() >= 500 {
				tracing::error!(path = %path, error = %err, "request failed");
			}
			Response::from_error(&err, &path)
		}
	}
}

/// HTTP Server with middleware support
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	middlewares: Vec<Arc<dyn Middleware>>,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
		}
	}

	/// Middlewares are executed in the order they are added.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	fn build_handler(&self) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			return self.handler.clone();
		}
		let chain = self
			.middlewares
			.iter()
			.fold(MiddlewareChain::new(self.handler.clone()), |chain, mw| {
				chain.with_middleware(mw.clone())
			});
		Arc::new(chain)
	}

	/// Accept connections on `listener` until `coordinator` fires.
	pub async fn serve(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> std::io::Result<()> {
		let handler = self.build_handler();

		tracing::info!(addr = ?listener.local_addr().ok(), "HTTP server listening");

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = result?;
					let handler = handler.clone();
					let conn_shutdown = coordinator.clone();

					tokio::spawn(async move {
						tokio::select! {
							result = Self::handle_connection(stream, remote_addr, handler) => {
								if let Err(err) = result {
									tracing::debug!(%remote_addr, error = %err, "connection closed with error");
								}
							}
							_ = conn_shutdown.wait() => {}
						}
					});
				}
				_ = coordinator.wait() => {
					tracing::info!("HTTP server shutting down");
					break;
				}
			}
		}

		Ok(())
	}

	/// Bind `addr` and serve until `coordinator` fires.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> std::io::Result<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener, coordinator).await
	}

	async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
	) -> Result<(), hyper::Error> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};
		http1::Builder::new().serve_connection(io, service).await
	}
}

/// Service implementation for hyper
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body_bytes = body.collect().await?.to_bytes();

			let mut request = Request::new(
				parts.method,
				parts.uri,
				parts.version,
				parts.headers,
				body_bytes,
			);
			request.remote_addr = Some(remote_addr);

			let response = dispatch(handler.as_ref(), request).await;

			let mut builder = hyper::Response::builder().status(response.status);
			for (key, value) in response.headers.iter() {
				builder = builder.header(key, value);
			}
			Ok(builder.body(Full::new(response.body))?)
		})
	}
}
