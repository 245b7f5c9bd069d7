use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use taskflow_core::exception::Result;

use super::models::{NewNotification, Notification};

/// Persistence used by the fan-out path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
	async fn create(&self, notification: NewNotification) -> Result<Notification>;

	/// Unread rows of `user_id`, counted from storage.
	async fn unread_count(&self, user_id: &str) -> Result<i64>;
}

pub struct SqliteNotificationStore {
	pool: SqlitePool,
}

impl SqliteNotificationStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

pub async fn count_unread(pool: &SqlitePool, user_id: &str) -> Result<i64> {
	let (count,): (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0")
			.bind(user_id)
			.fetch_one(pool)
			.await?;
	Ok(count)
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
	async fn create(&self, notification: NewNotification) -> Result<Notification> {
		let created = sqlx::query_as::<_, Notification>(
			"INSERT INTO notifications (id, type, title, message, user_id, entity_id, is_read, created_at)
			 VALUES (?, ?, ?, ?, ?, ?, 0, ?)
			 RETURNING *",
		)
		.bind(crate::db::new_id())
		.bind(notification.kind)
		.bind(&notification.title)
		.bind(&notification.message)
		.bind(&notification.user_id)
		.bind(&notification.entity_id)
		.bind(Utc::now())
		.fetch_one(&self.pool)
		.await?;
		Ok(created)
	}

	async fn unread_count(&self, user_id: &str) -> Result<i64> {
		count_unread(&self.pool, user_id).await
	}
}
