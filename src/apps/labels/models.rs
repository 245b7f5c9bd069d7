use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Label {
	pub id: String,
	pub name: String,
	pub color: String,
	pub created_at: DateTime<Utc>,
}

impl Label {
	pub async fn get(pool: &SqlitePool, id: &str) -> Result<Label> {
		sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or_else(|| Error::NotFound("Label not found".to_string()))
	}
}
