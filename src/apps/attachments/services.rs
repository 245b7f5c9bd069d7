use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use taskflow_core::exception::Result;
use taskflow_core::permissions::Action;

use super::models::{Attachment, CreateAttachmentRequest};
use crate::apps::activity::NewActivity;
use crate::apps::auth::User;
use crate::apps::notifications::Dispatcher;
use crate::apps::projects::access;
use crate::apps::tasks::Task;

/// Attachments of a task, newest first.
pub async fn list(pool: &SqlitePool, actor: &User, task_id: &str) -> Result<Vec<Attachment>> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::Read).await?;

	let attachments = sqlx::query_as::<_, Attachment>(
		"SELECT * FROM attachments WHERE task_id = ? ORDER BY created_at DESC, rowid DESC",
	)
	.bind(task_id)
	.fetch_all(pool)
	.await?;
	Ok(attachments)
}

pub async fn create(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	task_id: &str,
	payload: CreateAttachmentRequest,
) -> Result<Attachment> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::ContributeToTask).await?;

	let attachment = sqlx::query_as::<_, Attachment>(
		"INSERT INTO attachments (id, file_name, file_url, file_size, mime_type, task_id, uploaded_by_id, created_at)
		 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
		 RETURNING *",
	)
	.bind(crate::db::new_id())
	.bind(&payload.file_name)
	.bind(&payload.file_url)
	.bind(payload.file_size)
	.bind(&payload.mime_type)
	.bind(task_id)
	.bind(&actor.id)
	.bind(Utc::now())
	.fetch_one(pool)
	.await?;

	dispatcher
		.record(
			NewActivity::new("uploaded", "Attachment", &attachment.id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.on_task(task_id)
				.with_metadata(json!({ "fileName": attachment.file_name })),
		)
		.await;
	Ok(attachment)
}

pub async fn delete(pool: &SqlitePool, dispatcher: &Dispatcher, actor: &User, id: &str) -> Result<()> {
	let attachment = Attachment::get(pool, id).await?;
	let task = Task::get(pool, &attachment.task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::ContributeToTask).await?;

	sqlx::query("DELETE FROM attachments WHERE id = ?")
		.bind(id)
		.execute(pool)
		.await?;

	dispatcher
		.record(
			NewActivity::new("removed", "Attachment", id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.on_task(&task.id)
				.with_metadata(json!({ "fileName": attachment.file_name })),
		)
		.await;
	Ok(())
}
