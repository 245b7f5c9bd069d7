use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};
use taskflow_core::permissions::{Action, CommentEdit, authorize_comment_edit};
use validator::Validate;

use super::mentions::mentioned_emails;
use super::models::{Comment, CommentRow, CommentWithAuthor, SELECT_WITH_AUTHOR};
use crate::apps::activity::NewActivity;
use crate::apps::auth::User;
use crate::apps::notifications::{Dispatcher, Notice, NotificationType, recipients};
use crate::apps::projects::access;
use crate::apps::projects::models::Project;
use crate::apps::tasks::Task;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
	#[validate(length(min = 1, message = "content should not be empty"))]
	pub content: String,
}

async fn with_author(pool: &SqlitePool, id: &str) -> Result<CommentWithAuthor> {
	let row: CommentRow = sqlx::query_as(&format!("{SELECT_WITH_AUTHOR} WHERE c.id = ?"))
		.bind(id)
		.fetch_optional(pool)
		.await?
		.ok_or_else(|| Error::NotFound("Comment not found".to_string()))?;
	Ok(row.into())
}

/// Comments of a task, newest first.
pub async fn list(pool: &SqlitePool, actor: &User, task_id: &str) -> Result<Vec<CommentWithAuthor>> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::Read).await?;

	let rows: Vec<CommentRow> = sqlx::query_as(&format!(
		"{SELECT_WITH_AUTHOR} WHERE c.task_id = ? ORDER BY c.created_at DESC, c.rowid DESC"
	))
	.bind(task_id)
	.fetch_all(pool)
	.await?;
	Ok(rows.into_iter().map(CommentWithAuthor::from).collect())
}

/// Participants of `project` addressed by `@email` in `content`.
async fn mentioned_participants(pool: &SqlitePool, project: &Project, content: &str) -> Result<Vec<String>> {
	let emails = mentioned_emails(content);
	if emails.is_empty() {
		return Ok(Vec::new());
	}
	let users: Vec<(String,)> = crate::db::fetch_in(
		pool,
		"SELECT id FROM users WHERE LOWER(email) IN (",
		")",
		&emails,
	)
	.await?;

	let mut participants = Vec::new();
	for (user_id,) in users {
		if access::is_participant(pool, project, &user_id).await? {
			participants.push(user_id);
		}
	}
	Ok(participants)
}

/// Post a comment and notify the task's owner and assignees, plus any
/// mentioned project participant not already covered.
pub async fn create(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	task_id: &str,
	payload: CommentRequest,
) -> Result<CommentWithAuthor> {
	let task = Task::get(pool, task_id).await?;
	let access = access::require(pool, &actor.caller(), &task.project_id, Action::Comment).await?;

	let now = Utc::now();
	let comment = sqlx::query_as::<_, Comment>(
		"INSERT INTO comments (id, content, task_id, author_id, created_at, updated_at)
		 VALUES (?, ?, ?, ?, ?, ?)
		 RETURNING *",
	)
	.bind(crate::db::new_id())
	.bind(&payload.content)
	.bind(task_id)
	.bind(&actor.id)
	.bind(now)
	.bind(now)
	.fetch_one(pool)
	.await?;

	dispatcher
		.record(
			NewActivity::new("added", "Comment", &comment.id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.on_task(task_id),
		)
		.await;

	let audience = match task.audience(pool).await {
		Ok(audience) => recipients(&actor.id, &audience),
		Err(err) => {
			tracing::warn!(task_id, error = %err, "failed to load task audience");
			Vec::new()
		}
	};
	let notice = Notice::new(NotificationType::CommentAdded, actor.display_name(), &task.title, task_id);
	dispatcher.notify_all(&audience, &notice).await;

	match mentioned_participants(pool, &access.project, &payload.content).await {
		Ok(mentioned) => {
			let mentioned: Vec<String> = recipients(&actor.id, &mentioned)
				.into_iter()
				.filter(|user_id| !audience.contains(user_id))
				.collect();
			let notice = Notice::new(NotificationType::Mention, actor.display_name(), &task.title, task_id);
			dispatcher.notify_all(&mentioned, &notice).await;
		}
		Err(err) => tracing::warn!(task_id, error = %err, "failed to resolve mentions"),
	}

	with_author(pool, &comment.id).await
}

async fn authorize_edit(pool: &SqlitePool, actor: &User, comment: &Comment, edit: CommentEdit) -> Result<()> {
	let task = Task::get(pool, &comment.task_id).await?;
	let (_, role) = access::resolve(pool, &actor.caller(), &task.project_id).await?;
	authorize_comment_edit(role, comment.author_id == actor.id, edit)
}

pub async fn update(pool: &SqlitePool, actor: &User, id: &str, payload: CommentRequest) -> Result<CommentWithAuthor> {
	let comment = Comment::get(pool, id).await?;
	authorize_edit(pool, actor, &comment, CommentEdit::Update).await?;

	sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
		.bind(&payload.content)
		.bind(Utc::now())
		.bind(id)
		.execute(pool)
		.await?;
	with_author(pool, id).await
}

pub async fn delete(pool: &SqlitePool, actor: &User, id: &str) -> Result<()> {
	let comment = Comment::get(pool, id).await?;
	authorize_edit(pool, actor, &comment, CommentEdit::Delete).await?;

	sqlx::query("DELETE FROM comments WHERE id = ?")
		.bind(id)
		.execute(pool)
		.await?;
	Ok(())
}

