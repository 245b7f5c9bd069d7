use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};
use taskflow_core::permissions::Action;
use validator::Validate;

use super::models::Label;
use crate::apps::activity::NewActivity;
use crate::apps::auth::User;
use crate::apps::notifications::Dispatcher;
use crate::apps::projects::access;
use crate::apps::tasks::{Task, TaskDetail};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLabelRequest {
	#[validate(length(min = 1, max = 50, message = "name must be between 1 and 50 characters"))]
	pub name: String,
	#[validate(length(min = 1, message = "color should not be empty"))]
	pub color: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLabelRequest {
	#[validate(length(min = 1, max = 50, message = "name must be between 1 and 50 characters"))]
	pub name: Option<String>,
	#[validate(length(min = 1, message = "color should not be empty"))]
	pub color: Option<String>,
}

fn admin_only(actor: &User) -> Result<()> {
	if actor.is_admin() {
		Ok(())
	} else {
		Err(Error::Forbidden("Only admins can manage labels".to_string()))
	}
}

fn duplicate_name(err: Error) -> Error {
	match err {
		Error::Conflict(_) => Error::Conflict("Label name already exists".to_string()),
		other => other,
	}
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Label>> {
	let labels = sqlx::query_as::<_, Label>("SELECT * FROM labels ORDER BY name")
		.fetch_all(pool)
		.await?;
	Ok(labels)
}

pub async fn create(pool: &SqlitePool, payload: CreateLabelRequest) -> Result<Label> {
	sqlx::query_as::<_, Label>(
		"INSERT INTO labels (id, name, color, created_at) VALUES (?, ?, ?, ?) RETURNING *",
	)
	.bind(crate::db::new_id())
	.bind(payload.name.trim())
	.bind(&payload.color)
	.bind(Utc::now())
	.fetch_one(pool)
	.await
	.map_err(|err| duplicate_name(err.into()))
}

pub async fn update(pool: &SqlitePool, actor: &User, id: &str, payload: UpdateLabelRequest) -> Result<Label> {
	admin_only(actor)?;
	Label::get(pool, id).await?;

	sqlx::query_as::<_, Label>(
		"UPDATE labels SET name = COALESCE(?, name), color = COALESCE(?, color) WHERE id = ? RETURNING *",
	)
	.bind(payload.name.as_deref().map(str::trim))
	.bind(&payload.color)
	.bind(id)
	.fetch_one(pool)
	.await
	.map_err(|err| duplicate_name(err.into()))
}

pub async fn delete(pool: &SqlitePool, actor: &User, id: &str) -> Result<()> {
	admin_only(actor)?;
	Label::get(pool, id).await?;

	sqlx::query("DELETE FROM labels WHERE id = ?")
		.bind(id)
		.execute(pool)
		.await?;
	Ok(())
}

/// Attach `label_id` to a task. Attaching twice is a no-op.
pub async fn attach(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	task_id: &str,
	label_id: &str,
) -> Result<TaskDetail> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::LabelTask).await?;
	let label = Label::get(pool, label_id).await?;

	let inserted = sqlx::query("INSERT OR IGNORE INTO task_labels (task_id, label_id) VALUES (?, ?)")
		.bind(task_id)
		.bind(label_id)
		.execute(pool)
		.await?
		.rows_affected();

	if inserted > 0 {
		dispatcher
			.record(
				NewActivity::new("labeled", "Task", task_id)
					.by(&actor.id)
					.in_project(&task.project_id)
					.on_task(task_id)
					.with_metadata(json!({ "labelId": label.id, "label": label.name })),
			)
			.await;
	}
	TaskDetail::load_one(pool, task).await
}

pub async fn detach(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	task_id: &str,
	label_id: &str,
) -> Result<TaskDetail> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::LabelTask).await?;
	let label = Label::get(pool, label_id).await?;

	let removed = sqlx::query("DELETE FROM task_labels WHERE task_id = ? AND label_id = ?")
		.bind(task_id)
		.bind(label_id)
		.execute(pool)
		.await?
		.rows_affected();

	if removed > 0 {
		dispatcher
			.record(
				NewActivity::new("unlabeled", "Task", task_id)
					.by(&actor.id)
					.in_project(&task.project_id)
					.on_task(task_id)
					.with_metadata(json!({ "labelId": label.id, "label": label.name })),
			)
			.await;
	}
	TaskDetail::load_one(pool, task).await
}
