use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use taskflow_core::exception::Result;

use super::models::NewActivity;

/// Sink for activity rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityStore: Send + Sync {
	async fn record(&self, activity: NewActivity) -> Result<()>;
}

pub struct SqliteActivityStore {
	pool: SqlitePool,
}

impl SqliteActivityStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl ActivityStore for SqliteActivityStore {
	async fn record(&self, activity: NewActivity) -> Result<()> {
		sqlx::query(
			"INSERT INTO activities (id, action, entity, entity_id, user_id, project_id, task_id, metadata, created_at)
			 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(crate::db::new_id())
		.bind(activity.action)
		.bind(activity.entity)
		.bind(&activity.entity_id)
		.bind(&activity.user_id)
		.bind(&activity.project_id)
		.bind(&activity.task_id)
		.bind(activity.metadata.to_string())
		.bind(Utc::now())
		.execute(&self.pool)
		.await?;
		Ok(())
	}
}
