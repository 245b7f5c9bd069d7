use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};

use crate::apps::auth::UserSummary;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
	pub id: String,
	pub content: String,
	pub task_id: String,
	#[serde(rename = "userId")]
	pub author_id: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Comment {
	pub async fn get(pool: &SqlitePool, id: &str) -> Result<Comment> {
		sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or_else(|| Error::NotFound("Comment not found".to_string()))
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CommentRow {
	#[sqlx(flatten)]
	pub comment: Comment,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub avatar: Option<String>,
}

/// Comment with its author.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
	#[serde(flatten)]
	pub comment: Comment,
	pub user: UserSummary,
}

impl From<CommentRow> for CommentWithAuthor {
	fn from(row: CommentRow) -> Self {
		Self {
			user: UserSummary {
				id: row.comment.author_id.clone(),
				email: row.email,
				first_name: row.first_name,
				last_name: row.last_name,
				avatar: row.avatar,
			},
			comment: row.comment,
		}
	}
}

pub(crate) const SELECT_WITH_AUTHOR: &str = "SELECT c.id, c.content, c.task_id, c.author_id, c.created_at, c.updated_at,
	u.email, u.first_name, u.last_name, u.avatar
	FROM comments c JOIN users u ON u.id = c.author_id";
