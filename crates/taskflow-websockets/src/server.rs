//! WebSocket accept loop for live channels.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::{StatusCode, header};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::connection::{ClientEvent, LiveEvent, WebSocketError, WebSocketResult};
use crate::registry::ChannelRegistry;

/// Identity checks for a socket.
///
/// Token verification runs synchronously inside the upgrade handshake so a
/// bad token is answered with `401`. The async [`admit`](Self::admit) check
/// runs right after the upgrade; failing it closes the socket immediately.
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
	/// Validate `token` and return the user id it identifies.
	fn verify_token(&self, token: &str) -> WebSocketResult<String>;

	/// Confirm the user still exists and is active.
	async fn admit(&self, user_id: &str) -> WebSocketResult<()>;

	/// Events queued for a freshly joined socket.
	async fn greeting(&self, _user_id: &str) -> Vec<LiveEvent> {
		Vec::new()
	}
}

/// Bearer token from the `Authorization` header, or the `token` query
/// parameter when the header is absent.
///
/// # Examples
///
/// ```
/// use taskflow_websockets::extract_token;
/// use tokio_tungstenite::tungstenite::handshake::server::Request;
///
/// let request = Request::builder().uri("/?token=abc").body(()).unwrap();
/// assert_eq!(extract_token(&request).as_deref(), Some("abc"));
///
/// let request = Request::builder()
///     .uri("/?token=ignored")
///     .header("authorization", "Bearer from-header")
///     .body(())
///     .unwrap();
/// assert_eq!(extract_token(&request).as_deref(), Some("from-header"));
/// ```
pub fn extract_token(request: &Request) -> Option<String> {
	let from_header = request
		.headers()
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|token| !token.is_empty());
	if let Some(token) = from_header {
		return Some(token.to_string());
	}

	request
		.uri()
		.query()?
		.split('&')
		.filter_map(|pair| pair.strip_prefix("token="))
		.find(|token| !token.is_empty())
		.map(str::to_string)
}

fn unauthorized(reason: &str) -> ErrorResponse {
	let mut response = ErrorResponse::new(Some(reason.to_string()));
	*response.status_mut() = StatusCode::UNAUTHORIZED;
	response
}

/// Live notification server.
pub struct LiveServer {
	registry: ChannelRegistry,
	authenticator: Arc<dyn SessionAuthenticator>,
}

impl LiveServer {
	pub fn new(registry: ChannelRegistry, authenticator: Arc<dyn SessionAuthenticator>) -> Self {
		Self {
			registry,
			authenticator,
		}
	}

	pub fn registry(&self) -> &ChannelRegistry {
		&self.registry
	}

	/// Accept sockets on `listener` until `shutdown` resolves.
	pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
	where
		F: Future<Output = ()> + Send,
	{
		tracing::info!(addr = ?listener.local_addr().ok(), "live channel server listening");
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, peer_addr) = result?;
					let registry = self.registry.clone();
					let authenticator = self.authenticator.clone();

					tokio::spawn(async move {
						if let Err(err) = Self::handle_connection(stream, peer_addr, registry, authenticator).await {
							tracing::debug!(%peer_addr, error = %err, "live connection ended with error");
						}
					});
				}
				_ = &mut shutdown => {
					tracing::info!("live channel server shutting down");
					break;
				}
			}
		}

		Ok(())
	}

	/// Run one socket from handshake to disconnect.
	pub async fn handle_connection(
		stream: TcpStream,
		peer_addr: SocketAddr,
		registry: ChannelRegistry,
		authenticator: Arc<dyn SessionAuthenticator>,
	) -> WebSocketResult<()> {
		let mut identified: Option<String> = None;
		let verifier = authenticator.clone();
		let callback = |request: &Request, response: Response| {
			let Some(token) = extract_token(request) else {
				return Err(unauthorized("Missing token"));
			};
			match verifier.verify_token(&token) {
				Ok(user_id) => {
					identified = Some(user_id);
					Ok(response)
				}
				Err(_) => Err(unauthorized("Invalid token")),
			}
		};

		let mut ws_stream = accept_hdr_async(stream, callback).await?;
		let user_id = identified.ok_or_else(|| WebSocketError::Unauthorized("Missing token".into()))?;

		if let Err(err) = authenticator.admit(&user_id).await {
			tracing::debug!(%peer_addr, %user_id, error = %err, "rejecting live connection");
			let frame = CloseFrame {
				code: CloseCode::Policy,
				reason: "Unauthorized".into(),
			};
			let _ = ws_stream.close(Some(frame)).await;
			return Err(err);
		}

		let (connection, mut outgoing) = registry.join(&user_id).await;
		tracing::info!(%peer_addr, %user_id, "live connection established");

		for event in authenticator.greeting(&user_id).await {
			connection.send(event)?;
		}

		let (mut write, mut read) = ws_stream.split();
		let result: WebSocketResult<()> = loop {
			tokio::select! {
				incoming = read.next() => match incoming {
					Some(Ok(Message::Text(text))) => match ClientEvent::parse(text.as_str()) {
						Ok(ClientEvent::Ping) => {
							if let Err(err) = connection.send(LiveEvent::Pong) {
								break Err(err);
							}
						}
						Err(err) => tracing::debug!(%user_id, error = %err, "ignoring client frame"),
					},
					Some(Ok(Message::Close(_))) | None => break Ok(()),
					Some(Ok(_)) => {}
					Some(Err(err)) => break Err(err.into()),
				},
				event = outgoing.recv() => {
					let Some(event) = event else {
						break Ok(());
					};
					let frame = match event.to_frame() {
						Ok(frame) => frame,
						Err(err) => break Err(err),
					};
					if let Err(err) = write.send(Message::text(frame)).await {
						break Err(err.into());
					}
				}
			}
		};

		registry.leave(&connection).await;
		tracing::info!(%peer_addr, %user_id, "live connection closed");
		result
	}
}
