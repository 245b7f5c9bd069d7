use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum WebSocketError {
	#[error("Unauthorized: {0}")]
	Unauthorized(String),
	#[error("Send error: {0}")]
	Send(String),
	#[error("Protocol error: {0}")]
	Protocol(String),
	#[error("Internal error: {0}")]
	Internal(String),
	#[error("Transport error: {0}")]
	Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type WebSocketResult<T> = Result<T, WebSocketError>;

/// Events pushed from the server to a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum LiveEvent {
	/// Full notification record, already serialized by the caller.
	NewNotification(Value),
	UnreadCount {
		count: i64,
	},
	#[serde(rename_all = "camelCase")]
	NotificationRead {
		notification_id: String,
	},
	Pong,
}

impl LiveEvent {
	/// Serialize into the JSON text frame sent over the wire.
	///
	/// # Examples
	///
	/// ```
	/// use taskflow_websockets::LiveEvent;
	///
	/// let frame = LiveEvent::UnreadCount { count: 2 }.to_frame().unwrap();
	/// assert_eq!(frame, r#"{"event":"unreadCount","data":{"count":2}}"#);
	/// ```
	pub fn to_frame(&self) -> WebSocketResult<String> {
		serde_json::to_string(self).map_err(|e| WebSocketError::Protocol(e.to_string()))
	}
}

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
	Ping,
}

impl ClientEvent {
	pub fn parse(frame: &str) -> WebSocketResult<Self> {
		serde_json::from_str(frame).map_err(|e| WebSocketError::Protocol(e.to_string()))
	}
}

/// One open socket belonging to a user.
///
/// Outgoing events are queued on an unbounded channel drained by the
/// socket's writer task.
#[derive(Debug)]
pub struct LiveConnection {
	id: String,
	user_id: String,
	tx: mpsc::UnboundedSender<LiveEvent>,
	closed: AtomicBool,
}

impl LiveConnection {
	/// # Examples
	///
	/// ```
	/// use taskflow_websockets::LiveConnection;
	/// use tokio::sync::mpsc;
	///
	/// let (tx, _rx) = mpsc::unbounded_channel();
	/// let conn = LiveConnection::new("c1".to_string(), "u1".to_string(), tx);
	/// assert_eq!(conn.id(), "c1");
	/// assert_eq!(conn.user_id(), "u1");
	/// ```
	pub fn new(id: String, user_id: String, tx: mpsc::UnboundedSender<LiveEvent>) -> Self {
		Self {
			id,
			user_id,
			tx,
			closed: AtomicBool::new(false),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn user_id(&self) -> &str {
		&self.user_id
	}

	/// Queue an event for this socket.
	///
	/// # Examples
	///
	/// ```
	/// use taskflow_websockets::{LiveConnection, LiveEvent};
	/// use tokio::sync::mpsc;
	///
	/// # tokio_test::block_on(async {
	/// let (tx, mut rx) = mpsc::unbounded_channel();
	/// let conn = LiveConnection::new("c1".to_string(), "u1".to_string(), tx);
	///
	/// conn.send(LiveEvent::Pong).unwrap();
	/// assert_eq!(rx.recv().await, Some(LiveEvent::Pong));
	/// # });
	/// ```
	pub fn send(&self, event: LiveEvent) -> WebSocketResult<()> {
		if self.is_closed() {
			return Err(WebSocketError::Send("Connection closed".to_string()));
		}
		self.tx
			.send(event)
			.map_err(|e| WebSocketError::Send(e.to_string()))
	}

	pub fn close(&self) {
		self.closed.store(true, Ordering::SeqCst);
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst) || self.tx.is_closed()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(LiveEvent::Pong, json!({"event": "pong"}))]
	#[case(LiveEvent::UnreadCount { count: 0 }, json!({"event": "unreadCount", "data": {"count": 0}}))]
	#[case(
		LiveEvent::NotificationRead { notification_id: "n1".into() },
		json!({"event": "notificationRead", "data": {"notificationId": "n1"}})
	)]
	#[case(
		LiveEvent::NewNotification(json!({"id": "n2", "type": "MENTION"})),
		json!({"event": "newNotification", "data": {"id": "n2", "type": "MENTION"}})
	)]
	fn test_event_wire_format(#[case] event: LiveEvent, #[case] expected: Value) {
		let frame = event.to_frame().unwrap();
		let value: Value = serde_json::from_str(&frame).unwrap();
		assert_eq!(value, expected);
	}

	#[rstest]
	#[case(r#"{"event":"ping"}"#, true)]
	#[case(r#"{"event":"subscribe"}"#, false)]
	#[case("ping", false)]
	fn test_client_event_parse(#[case] frame: &str, #[case] ok: bool) {
		assert_eq!(ClientEvent::parse(frame).is_ok(), ok);
	}

	#[rstest]
	fn test_send_after_close_fails() {
		let (tx, _rx) = mpsc::unbounded_channel();
		let conn = LiveConnection::new("c1".into(), "u1".into(), tx);

		conn.close();

		assert!(conn.is_closed());
		assert!(matches!(conn.send(LiveEvent::Pong), Err(WebSocketError::Send(_))));
	}

	#[rstest]
	fn test_dropped_receiver_marks_closed() {
		let (tx, rx) = mpsc::unbounded_channel();
		let conn = LiveConnection::new("c1".into(), "u1".into(), tx);

		drop(rx);

		assert!(conn.is_closed());
		assert!(conn.send(LiveEvent::Pong).is_err());
	}
}
