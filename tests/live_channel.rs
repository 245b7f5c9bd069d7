//! Live notification channel round trip over a real socket.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Team, TestApp};
use futures_util::{SinkExt, StreamExt};
use rstest::*;
use serde_json::{Value, json};
use serial_test::serial;
use taskflow::apps::notifications::LiveSessions;
use taskflow_http::ShutdownCoordinator;
use taskflow_websockets::LiveServer;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start(app: &TestApp, coordinator: &ShutdownCoordinator) -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let sessions = Arc::new(LiveSessions::new(app.pool.clone(), app.state.jwt.clone()));
	let stop = coordinator.clone();
	tokio::spawn(
		LiveServer::new(app.registry.clone(), sessions).serve(listener, async move { stop.wait().await }),
	);
	format!("ws://{addr}")
}

async fn next_event(socket: &mut Socket) -> Value {
	loop {
		let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
			.await
			.expect("event within timeout")
			.expect("socket open")
			.expect("valid frame");
		if let Message::Text(text) = message {
			return serde_json::from_str(text.as_str()).unwrap();
		}
	}
}

/// Test: a session is greeted with its unread count, receives pushes for
/// new notifications and answers pings.
#[rstest]
#[tokio::test]
#[serial]
async fn test_live_round_trip() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;
	let coordinator = ShutdownCoordinator::new();
	let url = start(&app, &coordinator).await;

	let (mut socket, _) = connect_async(format!("{url}/?token={}", team.editor.token))
		.await
		.unwrap();
	assert_eq!(
		next_event(&mut socket).await,
		json!({ "event": "unreadCount", "data": { "count": 0 } })
	);

	app.task(&team.owner, &team.project_id, "Ship it", &[&team.editor]).await;

	let pushed = next_event(&mut socket).await;
	assert_eq!(pushed["event"], "newNotification");
	assert_eq!(pushed["data"]["type"], "TASK_ASSIGNED");
	assert_eq!(pushed["data"]["message"], "Ada Lovelace assigned you: Ship it");
	assert_eq!(
		next_event(&mut socket).await,
		json!({ "event": "unreadCount", "data": { "count": 1 } })
	);

	socket
		.send(Message::text(r#"{"event":"ping"}"#))
		.await
		.unwrap();
	assert_eq!(next_event(&mut socket).await, json!({ "event": "pong" }));

	socket.close(None).await.ok();
	coordinator.shutdown();
}

/// Test: a bad or missing token is refused during the handshake.
#[rstest]
#[case("/?token=garbage")]
#[case("/")]
#[tokio::test]
#[serial]
async fn test_handshake_requires_token(#[case] path: &str) {
	let app = TestApp::new().await;
	let coordinator = ShutdownCoordinator::new();
	let url = start(&app, &coordinator).await;

	let err = connect_async(format!("{url}{path}")).await.unwrap_err();

	match err {
		tokio_tungstenite::tungstenite::Error::Http(response) => {
			assert_eq!(response.status().as_u16(), 401);
		}
		other => panic!("unexpected error: {other}"),
	}
	coordinator.shutdown();
}

/// Test: a valid token for a deleted user is closed straight after the
/// upgrade without joining a channel.
#[rstest]
#[tokio::test]
#[serial]
async fn test_deleted_user_is_closed() {
	let app = TestApp::new().await;
	let account = app.register("gone@example.com", "Gone", "User").await;
	sqlx::query("DELETE FROM users WHERE id = ?")
		.bind(&account.id)
		.execute(&app.pool)
		.await
		.unwrap();
	let coordinator = ShutdownCoordinator::new();
	let url = start(&app, &coordinator).await;

	let (mut socket, _) = connect_async(format!("{url}/?token={}", account.token)).await.unwrap();
	let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
		.await
		.expect("close within timeout");

	assert!(matches!(message, Some(Ok(Message::Close(_))) | None | Some(Err(_))));
	assert!(!app.registry.is_online(&account.id).await);
	coordinator.shutdown();
}
