use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
	pub id: String,
	pub title: String,
	pub is_complete: bool,
	pub position: i64,
	pub task_id: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Subtask {
	pub async fn get(pool: &SqlitePool, id: &str) -> Result<Subtask> {
		sqlx::query_as::<_, Subtask>("SELECT * FROM subtasks WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or_else(|| Error::NotFound("Subtask not found".to_string()))
	}

	pub async fn list_for_task(pool: &SqlitePool, task_id: &str) -> Result<Vec<Subtask>> {
		Ok(sqlx::query_as::<_, Subtask>(
			"SELECT * FROM subtasks WHERE task_id = ? ORDER BY position ASC, created_at ASC",
		)
		.bind(task_id)
		.fetch_all(pool)
		.await?)
	}
}
