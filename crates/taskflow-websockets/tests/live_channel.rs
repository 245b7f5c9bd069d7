//! End-to-end tests for the live channel server over real sockets.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rstest::rstest;
use serde_json::{Value, json};
use taskflow_websockets::{
	ChannelRegistry, LiveEvent, LiveServer, SessionAuthenticator, WebSocketError, WebSocketResult,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Tokens are `token-<user>`; the user `disabled` is never admitted.
struct StaticAuthenticator;

#[async_trait]
impl SessionAuthenticator for StaticAuthenticator {
	fn verify_token(&self, token: &str) -> WebSocketResult<String> {
		token
			.strip_prefix("token-")
			.map(str::to_string)
			.ok_or_else(|| WebSocketError::Unauthorized("Invalid token".into()))
	}

	async fn admit(&self, user_id: &str) -> WebSocketResult<()> {
		if user_id == "disabled" {
			return Err(WebSocketError::Unauthorized("User account is disabled".into()));
		}
		Ok(())
	}

	async fn greeting(&self, _user_id: &str) -> Vec<LiveEvent> {
		vec![LiveEvent::UnreadCount { count: 3 }]
	}
}

async fn start_server() -> (String, ChannelRegistry) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let registry = ChannelRegistry::new();
	let server = LiveServer::new(registry.clone(), Arc::new(StaticAuthenticator));

	tokio::spawn(server.serve(listener, std::future::pending()));
	(format!("ws://{}", addr), registry)
}

async fn next_json(client: &mut Client) -> Value {
	let message = timeout(Duration::from_secs(5), client.next())
		.await
		.expect("timed out waiting for frame")
		.expect("stream ended")
		.expect("socket error");
	serde_json::from_str(message.to_text().unwrap()).unwrap()
}

async fn connect_with_header(url: &str, token: &str) -> Client {
	let mut request = url.into_client_request().unwrap();
	request
		.headers_mut()
		.insert("authorization", format!("Bearer {}", token).parse().unwrap());
	let (client, _) = connect_async(request).await.unwrap();
	client
}

async fn wait_for_connections(registry: &ChannelRegistry, expected: usize) {
	timeout(Duration::from_secs(5), async {
		while registry.connection_count().await != expected {
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
	})
	.await
	.expect("connection count never settled");
}

// ============================================================================
// Handshake
// ============================================================================

/// Test: connecting with a header token receives the unread count first
#[rstest]
#[tokio::test]
async fn test_connect_receives_unread_count() {
	let (url, _registry) = start_server().await;
	let mut client = connect_with_header(&url, "token-alice").await;

	let first = next_json(&mut client).await;

	assert_eq!(first, json!({"event": "unreadCount", "data": {"count": 3}}));
}

/// Test: the token may also be passed as a query parameter
#[rstest]
#[tokio::test]
async fn test_connect_with_query_token() {
	let (url, registry) = start_server().await;
	let (mut client, _) = connect_async(format!("{}/?token=token-bob", url)).await.unwrap();

	next_json(&mut client).await;

	assert!(registry.is_online("bob").await);
}

/// Test: missing or invalid tokens are refused at the handshake
#[rstest]
#[case(None)]
#[case(Some("garbage"))]
#[tokio::test]
async fn test_handshake_rejects_bad_token(#[case] token: Option<&str>) {
	let (url, registry) = start_server().await;
	let target = match token {
		Some(token) => format!("{}/?token={}", url, token),
		None => url.clone(),
	};

	match connect_async(target).await {
		Err(tungstenite::Error::Http(response)) => {
			assert_eq!(response.status(), 401);
		}
		other => panic!("expected 401 handshake failure, got {:?}", other.map(|_| ())),
	}
	assert_eq!(registry.connection_count().await, 0);
}

/// Test: an inactive user is disconnected right after the upgrade
#[rstest]
#[tokio::test]
async fn test_inactive_user_is_closed() {
	let (url, registry) = start_server().await;
	let mut client = connect_with_header(&url, "token-disabled").await;

	let frame = timeout(Duration::from_secs(5), client.next())
		.await
		.expect("timed out waiting for close");

	assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));
	assert!(!registry.is_online("disabled").await);
}

// ============================================================================
// Events
// ============================================================================

/// Test: ping is answered with pong
#[rstest]
#[tokio::test]
async fn test_ping_pong() {
	let (url, _registry) = start_server().await;
	let mut client = connect_with_header(&url, "token-alice").await;
	next_json(&mut client).await;

	client
		.send(Message::text(r#"{"event":"ping"}"#))
		.await
		.unwrap();

	assert_eq!(next_json(&mut client).await, json!({"event": "pong"}));
}

/// Test: events reach every socket of the addressed user only
#[rstest]
#[tokio::test]
async fn test_push_reaches_only_target_user() {
	let (url, registry) = start_server().await;
	let mut alice_1 = connect_with_header(&url, "token-alice").await;
	let mut alice_2 = connect_with_header(&url, "token-alice").await;
	let mut carol = connect_with_header(&url, "token-carol").await;
	next_json(&mut alice_1).await;
	next_json(&mut alice_2).await;
	next_json(&mut carol).await;
	wait_for_connections(&registry, 3).await;

	let delivered = registry
		.send_to_user(
			"alice",
			LiveEvent::NewNotification(json!({"id": "n1", "type": "TASK_ASSIGNED"})),
		)
		.await;
	assert_eq!(delivered, 2);

	for client in [&mut alice_1, &mut alice_2] {
		let event = next_json(client).await;
		assert_eq!(event["event"], "newNotification");
		assert_eq!(event["data"]["id"], "n1");
	}

	carol
		.send(Message::text(r#"{"event":"ping"}"#))
		.await
		.unwrap();
	assert_eq!(next_json(&mut carol).await, json!({"event": "pong"}));
}

/// Test: closing a socket removes it from the registry
#[rstest]
#[tokio::test]
async fn test_disconnect_leaves_registry() {
	let (url, registry) = start_server().await;
	let mut client = connect_with_header(&url, "token-alice").await;
	next_json(&mut client).await;
	wait_for_connections(&registry, 1).await;

	client.close(None).await.unwrap();

	wait_for_connections(&registry, 0).await;
	assert!(!registry.is_online("alice").await);
}
