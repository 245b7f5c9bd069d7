use sqlx::SqlitePool;
use taskflow_core::exception::Result;
use taskflow_core::pagination::{PageQuery, Paginated};
use taskflow_core::permissions::{Action, Caller};

use super::models::{ActivityEntry, ActivityRow};
use crate::apps::projects::access;
use crate::apps::tasks::models::Task;

const SELECT_ENTRIES: &str = "SELECT a.id, a.action, a.entity, a.entity_id, a.user_id, a.project_id, a.task_id,
	a.metadata, a.created_at,
	u.email AS actor_email, u.first_name AS actor_first_name,
	u.last_name AS actor_last_name, u.avatar AS actor_avatar
	FROM activities a LEFT JOIN users u ON u.id = a.user_id";

#[derive(Clone, Copy)]
enum Scope {
	Project,
	Task,
}

impl Scope {
	fn column(self) -> &'static str {
		match self {
			Scope::Project => "project_id",
			Scope::Task => "task_id",
		}
	}
}

async fn page(pool: &SqlitePool, scope: Scope, id: &str, query: PageQuery) -> Result<Paginated<ActivityEntry>> {
	let column = scope.column();
	let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM activities WHERE {column} = ?"))
		.bind(id)
		.fetch_one(pool)
		.await?;

	let rows: Vec<ActivityRow> = sqlx::query_as(&format!(
		"{SELECT_ENTRIES} WHERE a.{column} = ? ORDER BY a.created_at DESC, a.rowid DESC LIMIT ? OFFSET ?"
	))
	.bind(id)
	.bind(query.limit())
	.bind(query.offset())
	.fetch_all(pool)
	.await?;

	Ok(Paginated::new(rows.into_iter().map(ActivityEntry::from).collect(), total, query))
}

/// Activity of a project, newest first.
pub async fn list_for_project(
	pool: &SqlitePool,
	caller: &Caller,
	project_id: &str,
	query: PageQuery,
) -> Result<Paginated<ActivityEntry>> {
	access::require(pool, caller, project_id, Action::Read).await?;
	page(pool, Scope::Project, project_id, query).await
}

/// Activity of a task, newest first.
pub async fn list_for_task(
	pool: &SqlitePool,
	caller: &Caller,
	task_id: &str,
	query: PageQuery,
) -> Result<Paginated<ActivityEntry>> {
	let task = Task::get(pool, task_id).await?;
	access::require(pool, caller, &task.project_id, Action::Read).await?;
	page(pool, Scope::Task, task_id, query).await
}
