use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use taskflow_core::exception::Result;
use taskflow_core::permissions::Action;
use validator::Validate;

use super::models::Subtask;
use crate::apps::activity::NewActivity;
use crate::apps::auth::User;
use crate::apps::notifications::Dispatcher;
use crate::apps::projects::access;
use crate::apps::tasks::Task;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubtaskRequest {
	#[validate(length(min = 1, message = "title should not be empty"))]
	pub title: String,
	pub is_complete: Option<bool>,
	pub position: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubtaskRequest {
	#[validate(length(min = 1, message = "title should not be empty"))]
	pub title: Option<String>,
	pub is_complete: Option<bool>,
	pub position: Option<i64>,
}

pub async fn list(pool: &SqlitePool, actor: &User, task_id: &str) -> Result<Vec<Subtask>> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::Read).await?;
	Subtask::list_for_task(pool, task_id).await
}

pub async fn create(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	task_id: &str,
	payload: CreateSubtaskRequest,
) -> Result<Subtask> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::ContributeToTask).await?;

	let now = Utc::now();
	let subtask = sqlx::query_as::<_, Subtask>(
		"INSERT INTO subtasks (id, title, is_complete, position, task_id, created_at, updated_at)
		 VALUES (?, ?, ?, ?, ?, ?, ?)
		 RETURNING *",
	)
	.bind(crate::db::new_id())
	.bind(&payload.title)
	.bind(payload.is_complete.unwrap_or(false))
	.bind(payload.position.unwrap_or(0))
	.bind(task_id)
	.bind(now)
	.bind(now)
	.fetch_one(pool)
	.await?;

	dispatcher
		.record(
			NewActivity::new("created", "Subtask", &subtask.id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.on_task(task_id)
				.with_metadata(json!({ "title": subtask.title })),
		)
		.await;
	Ok(subtask)
}

pub async fn update(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	id: &str,
	payload: UpdateSubtaskRequest,
) -> Result<Subtask> {
	let subtask = Subtask::get(pool, id).await?;
	let task = Task::get(pool, &subtask.task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::ContributeToTask).await?;

	let updated = sqlx::query_as::<_, Subtask>(
		"UPDATE subtasks SET
			title = COALESCE(?, title),
			is_complete = COALESCE(?, is_complete),
			position = COALESCE(?, position),
			updated_at = ?
		 WHERE id = ?
		 RETURNING *",
	)
	.bind(&payload.title)
	.bind(payload.is_complete)
	.bind(payload.position)
	.bind(Utc::now())
	.bind(id)
	.fetch_one(pool)
	.await?;

	if updated.is_complete && !subtask.is_complete {
		dispatcher
			.record(
				NewActivity::new("completed", "Subtask", id)
					.by(&actor.id)
					.in_project(&task.project_id)
					.on_task(&task.id)
					.with_metadata(json!({ "title": updated.title })),
			)
			.await;
	}
	Ok(updated)
}

pub async fn delete(pool: &SqlitePool, actor: &User, id: &str) -> Result<()> {
	let subtask = Subtask::get(pool, id).await?;
	let task = Task::get(pool, &subtask.task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::ContributeToTask).await?;

	sqlx::query("DELETE FROM subtasks WHERE id = ?")
		.bind(id)
		.execute(pool)
		.await?;
	Ok(())
}
