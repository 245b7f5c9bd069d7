//! Bridge between the app and the live channel server.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use taskflow_websockets::{
	ChannelRegistry, LiveEvent, SessionAuthenticator, WebSocketError, WebSocketResult,
};

use super::store::count_unread;
use crate::apps::auth::{JwtAuth, User};

/// Pushes an event to every open socket of a user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LivePublisher: Send + Sync {
	async fn publish(&self, user_id: &str, event: LiveEvent);
}

#[async_trait]
impl LivePublisher for ChannelRegistry {
	async fn publish(&self, user_id: &str, event: LiveEvent) {
		let delivered = self.send_to_user(user_id, event).await;
		tracing::debug!(user_id, delivered, "live event published");
	}
}

/// Authenticates live-channel sockets with the API's JWTs.
pub struct LiveSessions {
	pool: SqlitePool,
	jwt: Arc<JwtAuth>,
}

impl LiveSessions {
	pub fn new(pool: SqlitePool, jwt: Arc<JwtAuth>) -> Self {
		Self { pool, jwt }
	}
}

#[async_trait]
impl SessionAuthenticator for LiveSessions {
	fn verify_token(&self, token: &str) -> WebSocketResult<String> {
		self.jwt
			.verify(token)
			.map(|claims| claims.sub)
			.map_err(|err| WebSocketError::Unauthorized(err.to_string()))
	}

	async fn admit(&self, user_id: &str) -> WebSocketResult<()> {
		let user = User::find(&self.pool, user_id)
			.await
			.map_err(|err| WebSocketError::Internal(err.to_string()))?
			.ok_or_else(|| WebSocketError::Unauthorized("Unauthorized".to_string()))?;
		if !user.is_active {
			return Err(WebSocketError::Unauthorized(
				"User account is disabled".to_string(),
			));
		}
		Ok(())
	}

	async fn greeting(&self, user_id: &str) -> Vec<LiveEvent> {
		match count_unread(&self.pool, user_id).await {
			Ok(count) => vec![LiveEvent::UnreadCount { count }],
			Err(err) => {
				tracing::warn!(user_id, error = %err, "failed to count unread notifications");
				Vec::new()
			}
		}
	}
}
