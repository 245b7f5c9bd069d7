use chrono::Utc;
use serde_json::{Map, Value, json};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use taskflow_core::exception::{Error, Result};
use taskflow_core::pagination::{PageQuery, Paginated};
use taskflow_core::permissions::{Action, authorize_task_update};

use super::filters::TaskFilter;
use super::models::{Task, TaskDetail, TaskPriority, TaskStatus};
use super::serializers::{CreateTaskRequest, UpdateTaskRequest, parse_date};
use crate::apps::activity::NewActivity;
use crate::apps::auth::User;
use crate::apps::notifications::{Dispatcher, Notice, NotificationType, recipients};
use crate::apps::projects::access;

const TASK_ORDER: &str = " ORDER BY t.position ASC, t.created_at DESC, t.rowid DESC";

async fn replace_labels(conn: &mut SqliteConnection, task_id: &str, label_ids: &[String]) -> Result<()> {
	sqlx::query("DELETE FROM task_labels WHERE task_id = ?")
		.bind(task_id)
		.execute(&mut *conn)
		.await?;
	for label_id in label_ids {
		sqlx::query("INSERT OR IGNORE INTO task_labels (task_id, label_id) VALUES (?, ?)")
			.bind(task_id)
			.bind(label_id)
			.execute(&mut *conn)
			.await?;
	}
	Ok(())
}

/// Run a filtered, paginated task listing. `scope` opens the leading
/// condition on the task alias `t`; it is completed by one bound
/// `scope_value` and a closing parenthesis.
async fn page(
	pool: &SqlitePool,
	scope: &str,
	scope_value: &str,
	filter: &TaskFilter,
	query: PageQuery,
) -> Result<Paginated<TaskDetail>> {
	let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks t WHERE ");
	count.push(scope).push_bind(scope_value.to_string()).push(")");
	filter.push_conditions(&mut count)?;
	let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

	let mut select = QueryBuilder::<Sqlite>::new("SELECT t.* FROM tasks t WHERE ");
	select.push(scope).push_bind(scope_value.to_string()).push(")");
	filter.push_conditions(&mut select)?;
	select
		.push(TASK_ORDER)
		.push(" LIMIT ")
		.push_bind(query.limit())
		.push(" OFFSET ")
		.push_bind(query.offset());
	let tasks: Vec<Task> = select.build_query_as().fetch_all(pool).await?;

	Ok(Paginated::new(TaskDetail::load(pool, tasks).await?, total, query))
}

/// Tasks of a project, filtered and paginated.
pub async fn list_for_project(
	pool: &SqlitePool,
	actor: &User,
	project_id: &str,
	filter: &TaskFilter,
) -> Result<Paginated<TaskDetail>> {
	let query = filter.page_query()?;
	access::require(pool, &actor.caller(), project_id, Action::Read).await?;
	page(pool, "(t.project_id = ", project_id, filter, query).await
}

/// Tasks assigned to the caller across all projects.
pub async fn list_assigned(pool: &SqlitePool, actor: &User, filter: &TaskFilter) -> Result<Paginated<TaskDetail>> {
	let query = filter.page_query()?;
	page(
		pool,
		"(t.id IN (SELECT task_id FROM task_assignees WHERE user_id = ",
		&actor.id,
		filter,
		query,
	)
	.await
}

pub async fn get(pool: &SqlitePool, actor: &User, id: &str) -> Result<TaskDetail> {
	let task = Task::get(pool, id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::Read).await?;
	TaskDetail::load_one(pool, task).await
}

pub async fn create(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	payload: CreateTaskRequest,
) -> Result<TaskDetail> {
	let access = access::require(pool, &actor.caller(), &payload.project_id, Action::CreateTask).await?;
	let due_date = payload
		.due_date
		.as_deref()
		.map(|value| parse_date("dueDate", value))
		.transpose()?;
	for assignee_id in &payload.assignee_ids {
		if !access::is_participant(pool, &access.project, assignee_id).await? {
			return Err(Error::BadRequest(format!(
				"User {assignee_id} is not a member of this project"
			)));
		}
	}

	let now = Utc::now();
	let mut tx = pool.begin().await?;
	let task = sqlx::query_as::<_, Task>(
		"INSERT INTO tasks (id, title, description, status, priority, due_date, position, project_id, owner_id, created_at, updated_at)
		 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		 RETURNING *",
	)
	.bind(crate::db::new_id())
	.bind(&payload.title)
	.bind(&payload.description)
	.bind(payload.status.unwrap_or(TaskStatus::Todo))
	.bind(payload.priority.unwrap_or(TaskPriority::Medium))
	.bind(due_date)
	.bind(payload.position.unwrap_or(0))
	.bind(&payload.project_id)
	.bind(&actor.id)
	.bind(now)
	.bind(now)
	.fetch_one(&mut *tx)
	.await?;

	for assignee_id in &payload.assignee_ids {
		sqlx::query("INSERT OR IGNORE INTO task_assignees (task_id, user_id) VALUES (?, ?)")
			.bind(&task.id)
			.bind(assignee_id)
			.execute(&mut *tx)
			.await?;
	}
	replace_labels(&mut *tx, &task.id, &payload.label_ids).await?;
	tx.commit().await?;
	tracing::info!(task_id = %task.id, project_id = %task.project_id, "task created");

	dispatcher
		.record(
			NewActivity::new("created", "Task", &task.id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.on_task(&task.id)
				.with_metadata(json!({ "title": task.title })),
		)
		.await;
	let notice = Notice::new(NotificationType::TaskAssigned, actor.display_name(), &task.title, &task.id);
	dispatcher
		.notify_all(&recipients(&actor.id, &payload.assignee_ids), &notice)
		.await;

	TaskDetail::load_one(pool, task).await
}

fn changes_of(payload: &UpdateTaskRequest) -> Value {
	let mut changes = Map::new();
	if let Some(title) = &payload.title {
		changes.insert("title".into(), json!(title));
	}
	if let Some(description) = &payload.description {
		changes.insert("description".into(), json!(description));
	}
	if let Some(status) = payload.status {
		changes.insert("status".into(), json!(status));
	}
	if let Some(priority) = payload.priority {
		changes.insert("priority".into(), json!(priority));
	}
	if let Some(due_date) = &payload.due_date {
		changes.insert("dueDate".into(), json!(due_date));
	}
	if let Some(position) = payload.position {
		changes.insert("position".into(), json!(position));
	}
	if let Some(label_ids) = &payload.label_ids {
		changes.insert("labelIds".into(), json!(label_ids));
	}
	Value::Object(changes)
}

/// Apply a partial update.
///
/// Editors may only move the status of tasks assigned to them; any other
/// field in the same request rejects the whole request before anything is
/// written.
pub async fn update(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	id: &str,
	payload: UpdateTaskRequest,
) -> Result<TaskDetail> {
	let task = Task::get(pool, id).await?;
	let (_, role) = access::resolve(pool, &actor.caller(), &task.project_id).await?;
	let is_assigned = Task::is_assigned(pool, id, &actor.id).await?;
	authorize_task_update(role, is_assigned, payload.change())?;

	// Some(None) clears the due date
	let due_date = match &payload.due_date {
		Some(Some(value)) => Some(Some(parse_date("dueDate", value)?)),
		Some(None) => Some(None),
		None => None,
	};

	let mut tx = pool.begin().await?;
	let updated = sqlx::query_as::<_, Task>(
		"UPDATE tasks SET
			title = COALESCE(?, title),
			description = COALESCE(?, description),
			status = COALESCE(?, status),
			priority = COALESCE(?, priority),
			due_date = CASE WHEN ? THEN ? ELSE due_date END,
			position = COALESCE(?, position),
			updated_at = ?
		 WHERE id = ?
		 RETURNING *",
	)
	.bind(&payload.title)
	.bind(&payload.description)
	.bind(payload.status)
	.bind(payload.priority)
	.bind(due_date.is_some())
	.bind(due_date.flatten())
	.bind(payload.position)
	.bind(Utc::now())
	.bind(id)
	.fetch_one(&mut *tx)
	.await?;
	if let Some(label_ids) = &payload.label_ids {
		replace_labels(&mut *tx, id, label_ids).await?;
	}
	tx.commit().await?;

	dispatcher
		.record(
			NewActivity::new("updated", "Task", id)
				.by(&actor.id)
				.in_project(&updated.project_id)
				.on_task(id)
				.with_metadata(json!({ "title": updated.title, "changes": changes_of(&payload) })),
		)
		.await;

	let completed = updated.status == TaskStatus::Done && task.status != TaskStatus::Done;
	let kind = if completed {
		NotificationType::TaskCompleted
	} else {
		NotificationType::TaskUpdated
	};
	match updated.audience(pool).await {
		Ok(audience) => {
			let notice = Notice::new(kind, actor.display_name(), &updated.title, id);
			dispatcher
				.notify_all(&recipients(&actor.id, &audience), &notice)
				.await;
		}
		Err(err) => tracing::warn!(task_id = %id, error = %err, "failed to load task audience"),
	}

	TaskDetail::load_one(pool, updated).await
}

pub async fn delete(pool: &SqlitePool, dispatcher: &Dispatcher, actor: &User, id: &str) -> Result<()> {
	let task = Task::get(pool, id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::DeleteTask).await?;

	sqlx::query("DELETE FROM tasks WHERE id = ?")
		.bind(id)
		.execute(pool)
		.await?;

	// The task row is gone, so the activity is scoped to the project only
	dispatcher
		.record(
			NewActivity::new("deleted", "Task", id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.with_metadata(json!({ "title": task.title })),
		)
		.await;
	Ok(())
}

/// Add `assignee_id` to the task's assignees. The assignee must take part
/// in the project.
pub async fn assign(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	id: &str,
	assignee_id: &str,
) -> Result<TaskDetail> {
	let task = Task::get(pool, id).await?;
	let access = access::require(pool, &actor.caller(), &task.project_id, Action::AssignTask).await?;
	if User::find(pool, assignee_id).await?.is_none() {
		return Err(Error::NotFound("User not found".to_string()));
	}
	if !access::is_participant(pool, &access.project, assignee_id).await? {
		return Err(Error::BadRequest(
			"User is not a member of this project".to_string(),
		));
	}

	sqlx::query("INSERT OR IGNORE INTO task_assignees (task_id, user_id) VALUES (?, ?)")
		.bind(id)
		.bind(assignee_id)
		.execute(pool)
		.await?;

	dispatcher
		.record(
			NewActivity::new("assigned", "Task", id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.on_task(id)
				.with_metadata(json!({ "assigneeId": assignee_id, "title": task.title })),
		)
		.await;
	if assignee_id != actor.id {
		let notice = Notice::new(NotificationType::TaskAssigned, actor.display_name(), &task.title, id);
		dispatcher.notify(assignee_id, &notice).await;
	}

	TaskDetail::load_one(pool, task).await
}

pub async fn unassign(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	id: &str,
	assignee_id: &str,
) -> Result<TaskDetail> {
	let task = Task::get(pool, id).await?;
	access::require(pool, &actor.caller(), &task.project_id, Action::AssignTask).await?;

	sqlx::query("DELETE FROM task_assignees WHERE task_id = ? AND user_id = ?")
		.bind(id)
		.bind(assignee_id)
		.execute(pool)
		.await?;

	dispatcher
		.record(
			NewActivity::new("unassigned", "Task", id)
				.by(&actor.id)
				.in_project(&task.project_id)
				.on_task(id)
				.with_metadata(json!({ "assigneeId": assignee_id, "title": task.title })),
		)
		.await;

	TaskDetail::load_one(pool, task).await
}
