//! User-addressed connection registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use crate::connection::{LiveConnection, LiveEvent};

/// Maps each user to the sockets they currently hold.
///
/// Cloning is cheap; clones share the same table.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
	users: Arc<RwLock<HashMap<String, HashMap<String, Arc<LiveConnection>>>>>,
}

impl ChannelRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new socket for `user_id`.
	///
	/// Returns the connection handle and the receiving end that the socket's
	/// writer drains.
	pub async fn join(
		&self,
		user_id: &str,
	) -> (Arc<LiveConnection>, mpsc::UnboundedReceiver<LiveEvent>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let id = uuid::Uuid::new_v4().to_string();
		let connection = Arc::new(LiveConnection::new(id.clone(), user_id.to_string(), tx));

		self.users
			.write()
			.await
			.entry(user_id.to_string())
			.or_default()
			.insert(id, connection.clone());

		tracing::debug!(user_id, connection_id = connection.id(), "live connection joined");
		(connection, rx)
	}

	/// Remove a socket. Users left with no sockets are dropped from the table.
	pub async fn leave(&self, connection: &LiveConnection) {
		connection.close();
		let mut users = self.users.write().await;
		if let Some(sockets) = users.get_mut(connection.user_id()) {
			sockets.remove(connection.id());
			if sockets.is_empty() {
				users.remove(connection.user_id());
			}
		}
		tracing::debug!(
			user_id = connection.user_id(),
			connection_id = connection.id(),
			"live connection left"
		);
	}

	/// Deliver `event` to every socket `user_id` holds.
	///
	/// Returns the number of sockets the event was queued on. A user with no
	/// open sockets is not an error.
	pub async fn send_to_user(&self, user_id: &str, event: LiveEvent) -> usize {
		let users = self.users.read().await;
		let Some(sockets) = users.get(user_id) else {
			return 0;
		};

		let mut delivered = 0;
		for connection in sockets.values() {
			match connection.send(event.clone()) {
				Ok(()) => delivered += 1,
				Err(err) => tracing::debug!(
					user_id,
					connection_id = connection.id(),
					error = %err,
					"dropping event for closed connection"
				),
			}
		}
		delivered
	}

	pub async fn is_online(&self, user_id: &str) -> bool {
		self.users.read().await.contains_key(user_id)
	}

	pub async fn connection_count(&self) -> usize {
		self.users.read().await.values().map(HashMap::len).sum()
	}

	pub async fn user_count(&self) -> usize {
		self.users.read().await.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_event_reaches_every_socket_of_user() {
		let registry = ChannelRegistry::new();
		let (_a, mut rx_a) = registry.join("alice").await;
		let (_b, mut rx_b) = registry.join("alice").await;

		let delivered = registry
			.send_to_user("alice", LiveEvent::UnreadCount { count: 1 })
			.await;

		assert_eq!(delivered, 2);
		assert_eq!(rx_a.recv().await, Some(LiveEvent::UnreadCount { count: 1 }));
		assert_eq!(rx_b.recv().await, Some(LiveEvent::UnreadCount { count: 1 }));
	}

	#[rstest]
	#[tokio::test]
	async fn test_event_does_not_leak_to_other_users() {
		let registry = ChannelRegistry::new();
		let (_alice, _rx_alice) = registry.join("alice").await;
		let (_bob, mut rx_bob) = registry.join("bob").await;

		registry.send_to_user("alice", LiveEvent::Pong).await;

		assert!(rx_bob.try_recv().is_err());
	}

	#[rstest]
	#[tokio::test]
	async fn test_offline_user_is_noop() {
		let registry = ChannelRegistry::new();
		assert_eq!(registry.send_to_user("ghost", LiveEvent::Pong).await, 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_leave_removes_connection() {
		let registry = ChannelRegistry::new();
		let (first, _rx1) = registry.join("alice").await;
		let (second, _rx2) = registry.join("alice").await;
		assert_eq!(registry.connection_count().await, 2);

		registry.leave(&first).await;
		assert_eq!(registry.connection_count().await, 1);
		assert!(registry.is_online("alice").await);

		registry.leave(&second).await;
		assert_eq!(registry.user_count().await, 0);
		assert!(!registry.is_online("alice").await);
	}

	#[rstest]
	#[tokio::test]
	async fn test_closed_socket_is_skipped() {
		let registry = ChannelRegistry::new();
		let (_open, mut rx_open) = registry.join("alice").await;
		let (_gone, rx_gone) = registry.join("alice").await;
		drop(rx_gone);

		let delivered = registry.send_to_user("alice", LiveEvent::Pong).await;

		assert_eq!(delivered, 1);
		assert_eq!(rx_open.recv().await, Some(LiveEvent::Pong));
	}
}
