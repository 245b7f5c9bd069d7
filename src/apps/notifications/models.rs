use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
	TaskAssigned,
	TaskUpdated,
	TaskCompleted,
	CommentAdded,
	ProjectInvite,
	Mention,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	pub id: String,
	#[serde(rename = "type")]
	#[sqlx(rename = "type")]
	pub kind: NotificationType,
	pub title: String,
	pub message: String,
	pub user_id: String,
	pub entity_id: Option<String>,
	pub is_read: bool,
	pub created_at: DateTime<Utc>,
}

/// A notification about to be persisted, always unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
	pub user_id: String,
	pub kind: NotificationType,
	pub title: String,
	pub message: String,
	pub entity_id: Option<String>,
}
