use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use taskflow_core::exception::{Error, Result};
use taskflow_core::pagination::{PageQuery, Paginated};
use taskflow_core::permissions::NOT_A_MEMBER;

use crate::apps::auth::User;
use crate::apps::comments::CommentWithAuthor;
use crate::apps::comments::models::CommentRow;
use crate::apps::projects::access;
use crate::apps::tasks::filters::TaskFilter;
use crate::apps::tasks::{Task, TaskDetail, TaskPriority, TaskStatus};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSearchParams {
	pub q: Option<String>,
	pub status: Option<TaskStatus>,
	pub priority: Option<TaskPriority>,
	pub label_id: Option<String>,
	pub due_from: Option<String>,
	pub due_to: Option<String>,
	pub project_id: Option<String>,
	pub page: Option<i64>,
	pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSearchParams {
	pub q: Option<String>,
	pub task_status: Option<TaskStatus>,
	pub task_priority: Option<TaskPriority>,
	pub label_id: Option<String>,
	pub due_from: Option<String>,
	pub due_to: Option<String>,
	pub project_id: Option<String>,
	pub page: Option<i64>,
	pub limit: Option<i64>,
}

/// Task fields shown next to a matching comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBrief {
	pub id: String,
	pub title: String,
	pub status: TaskStatus,
	pub priority: TaskPriority,
	pub due_date: Option<DateTime<Utc>>,
	pub project_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentHit {
	#[serde(flatten)]
	pub comment: CommentWithAuthor,
	pub task: TaskBrief,
}

#[derive(sqlx::FromRow)]
struct CommentHitRow {
	#[sqlx(flatten)]
	comment: CommentRow,
	task_title: String,
	task_status: TaskStatus,
	task_priority: TaskPriority,
	task_due_date: Option<DateTime<Utc>>,
	task_project_id: String,
}

impl From<CommentHitRow> for CommentHit {
	fn from(row: CommentHitRow) -> Self {
		let task = TaskBrief {
			id: row.comment.comment.task_id.clone(),
			title: row.task_title,
			status: row.task_status,
			priority: row.task_priority,
			due_date: row.task_due_date,
			project_id: row.task_project_id,
		};
		Self {
			comment: row.comment.into(),
			task,
		}
	}
}

/// Projects a search may cover. `None` means no restriction (admins).
///
/// Asking for a specific project the caller cannot read is refused rather
/// than silently returning nothing.
async fn project_scope(pool: &SqlitePool, actor: &User, requested: Option<&str>) -> Result<Option<Vec<String>>> {
	let accessible = access::accessible_project_ids(pool, &actor.caller()).await?;
	match (accessible, requested) {
		(None, None) => Ok(None),
		(None, Some(project_id)) => Ok(Some(vec![project_id.to_string()])),
		(Some(ids), None) => Ok(Some(ids)),
		(Some(ids), Some(project_id)) if ids.iter().any(|id| id == project_id) => {
			Ok(Some(vec![project_id.to_string()]))
		}
		(Some(_), Some(_)) => Err(Error::Forbidden(NOT_A_MEMBER.to_string())),
	}
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: &Option<Vec<String>>) {
	if let Some(ids) = scope {
		builder.push(" AND t.project_id IN (");
		let mut separated = builder.separated(", ");
		for id in ids {
			separated.push_bind(id.clone());
		}
		builder.push(")");
	}
}

pub async fn search_tasks(pool: &SqlitePool, actor: &User, params: TaskSearchParams) -> Result<Paginated<TaskDetail>> {
	let query = PageQuery::new(params.page, params.limit)?;
	let scope = project_scope(pool, actor, params.project_id.as_deref()).await?;
	if scope.as_ref().is_some_and(Vec::is_empty) {
		return Ok(Paginated::empty(query));
	}

	let filter = TaskFilter {
		status: params.status,
		priority: params.priority,
		label_id: params.label_id,
		search: params.q,
		due_from: params.due_from,
		due_to: params.due_to,
		..TaskFilter::default()
	};

	let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks t WHERE 1 = 1");
	push_scope(&mut count, &scope);
	filter.push_conditions(&mut count)?;
	let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

	let mut select = QueryBuilder::<Sqlite>::new("SELECT t.* FROM tasks t WHERE 1 = 1");
	push_scope(&mut select, &scope);
	filter.push_conditions(&mut select)?;
	select
		.push(" ORDER BY t.updated_at DESC, t.created_at DESC, t.rowid DESC LIMIT ")
		.push_bind(query.limit())
		.push(" OFFSET ")
		.push_bind(query.offset());
	let tasks: Vec<Task> = select.build_query_as().fetch_all(pool).await?;

	Ok(Paginated::new(TaskDetail::load(pool, tasks).await?, total, query))
}

fn push_comment_conditions(
	builder: &mut QueryBuilder<'_, Sqlite>,
	scope: &Option<Vec<String>>,
	filter: &TaskFilter,
	needle: Option<&str>,
) -> Result<()> {
	push_scope(builder, scope);
	filter.push_conditions(builder)?;
	if let Some(needle) = needle {
		builder
			.push(" AND c.content LIKE ")
			.push_bind(crate::db::like_pattern(needle))
			.push(" ESCAPE '\\'");
	}
	Ok(())
}

pub async fn search_comments(
	pool: &SqlitePool,
	actor: &User,
	params: CommentSearchParams,
) -> Result<Paginated<CommentHit>> {
	let query = PageQuery::new(params.page, params.limit)?;
	let scope = project_scope(pool, actor, params.project_id.as_deref()).await?;
	if scope.as_ref().is_some_and(Vec::is_empty) {
		return Ok(Paginated::empty(query));
	}

	let needle = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
	let filter = TaskFilter {
		status: params.task_status,
		priority: params.task_priority,
		label_id: params.label_id,
		due_from: params.due_from,
		due_to: params.due_to,
		..TaskFilter::default()
	};

	let mut count = QueryBuilder::<Sqlite>::new(
		"SELECT COUNT(*) FROM comments c JOIN tasks t ON t.id = c.task_id WHERE 1 = 1",
	);
	push_comment_conditions(&mut count, &scope, &filter, needle)?;
	let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

	let mut select = QueryBuilder::<Sqlite>::new(
		"SELECT c.id, c.content, c.task_id, c.author_id, c.created_at, c.updated_at,
			u.email, u.first_name, u.last_name, u.avatar,
			t.title AS task_title, t.status AS task_status, t.priority AS task_priority,
			t.due_date AS task_due_date, t.project_id AS task_project_id
		 FROM comments c
		 JOIN tasks t ON t.id = c.task_id
		 JOIN users u ON u.id = c.author_id
		 WHERE 1 = 1",
	);
	push_comment_conditions(&mut select, &scope, &filter, needle)?;
	select
		.push(" ORDER BY c.created_at DESC, c.rowid DESC LIMIT ")
		.push_bind(query.limit())
		.push(" OFFSET ")
		.push_bind(query.offset());
	let rows: Vec<CommentHitRow> = select.build_query_as().fetch_all(pool).await?;

	Ok(Paginated::new(
		rows.into_iter().map(CommentHit::from).collect(),
		total,
		query,
	))
}
