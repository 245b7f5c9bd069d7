use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};

use crate::apps::auth::UserSummary;
use crate::apps::labels::models::Label;
use crate::apps::projects::models::ProjectSummary;
use crate::apps::subtasks::models::Subtask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
	Todo,
	InProgress,
	InReview,
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
	Low,
	Medium,
	High,
	Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
	pub id: String,
	pub title: String,
	pub description: Option<String>,
	pub status: TaskStatus,
	pub priority: TaskPriority,
	pub due_date: Option<DateTime<Utc>>,
	pub position: i64,
	pub project_id: String,
	pub owner_id: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Task {
	pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<Task>> {
		Ok(sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?)
	}

	pub async fn get(pool: &SqlitePool, id: &str) -> Result<Task> {
		Self::find(pool, id)
			.await?
			.ok_or_else(|| Error::NotFound("Task not found".to_string()))
	}

	pub async fn assignee_ids(pool: &SqlitePool, task_id: &str) -> Result<Vec<String>> {
		let rows: Vec<(String,)> =
			sqlx::query_as("SELECT user_id FROM task_assignees WHERE task_id = ? ORDER BY rowid")
				.bind(task_id)
				.fetch_all(pool)
				.await?;
		Ok(rows.into_iter().map(|(id,)| id).collect())
	}

	pub async fn is_assigned(pool: &SqlitePool, task_id: &str, user_id: &str) -> Result<bool> {
		let (count,): (i64,) =
			sqlx::query_as("SELECT COUNT(*) FROM task_assignees WHERE task_id = ? AND user_id = ?")
				.bind(task_id)
				.bind(user_id)
				.fetch_one(pool)
				.await?;
		Ok(count > 0)
	}

	/// Owner first, then assignees.
	pub async fn audience(&self, pool: &SqlitePool) -> Result<Vec<String>> {
		let mut audience = vec![self.owner_id.clone()];
		audience.extend(Self::assignee_ids(pool, &self.id).await?);
		Ok(audience)
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct AssigneeRow {
	task_id: String,
	#[sqlx(flatten)]
	user: UserSummary,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LabelRow {
	task_id: String,
	#[sqlx(flatten)]
	label: Label,
}

/// A task with its assignees, labels, subtasks, owner and project.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
	#[serde(flatten)]
	pub task: Task,
	pub assignees: Vec<UserSummary>,
	pub labels: Vec<Label>,
	pub subtasks: Vec<Subtask>,
	pub owner: Option<UserSummary>,
	pub project: Option<ProjectSummary>,
}

impl TaskDetail {
	/// Attach related rows to `tasks`, keeping their order.
	pub async fn load(pool: &SqlitePool, tasks: Vec<Task>) -> Result<Vec<TaskDetail>> {
		if tasks.is_empty() {
			return Ok(Vec::new());
		}
		let ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
		let owner_ids: Vec<String> = tasks.iter().map(|t| t.owner_id.clone()).collect();
		let project_ids: Vec<String> = tasks.iter().map(|t| t.project_id.clone()).collect();

		let mut assignees: HashMap<String, Vec<UserSummary>> = HashMap::new();
		let rows: Vec<AssigneeRow> = crate::db::fetch_in(
			pool,
			"SELECT a.task_id, u.id, u.email, u.first_name, u.last_name, u.avatar
			 FROM task_assignees a JOIN users u ON u.id = a.user_id
			 WHERE a.task_id IN (",
			") ORDER BY a.rowid",
			&ids,
		)
		.await?;
		for row in rows {
			assignees.entry(row.task_id).or_default().push(row.user);
		}

		let mut labels: HashMap<String, Vec<Label>> = HashMap::new();
		let rows: Vec<LabelRow> = crate::db::fetch_in(
			pool,
			"SELECT tl.task_id, l.id, l.name, l.color, l.created_at
			 FROM task_labels tl JOIN labels l ON l.id = tl.label_id
			 WHERE tl.task_id IN (",
			") ORDER BY l.name",
			&ids,
		)
		.await?;
		for row in rows {
			labels.entry(row.task_id).or_default().push(row.label);
		}

		let mut subtasks: HashMap<String, Vec<Subtask>> = HashMap::new();
		let rows: Vec<Subtask> = crate::db::fetch_in(
			pool,
			"SELECT * FROM subtasks WHERE task_id IN (",
			") ORDER BY position ASC, created_at ASC",
			&ids,
		)
		.await?;
		for row in rows {
			subtasks.entry(row.task_id.clone()).or_default().push(row);
		}

		let owners = UserSummary::load_many(pool, &owner_ids).await?;
		let projects = ProjectSummary::load_many(pool, &project_ids).await?;

		Ok(tasks
			.into_iter()
			.map(|task| TaskDetail {
				assignees: assignees.remove(&task.id).unwrap_or_default(),
				labels: labels.remove(&task.id).unwrap_or_default(),
				subtasks: subtasks.remove(&task.id).unwrap_or_default(),
				owner: owners.get(&task.owner_id).cloned(),
				project: projects.get(&task.project_id).cloned(),
				task,
			})
			.collect())
	}

	pub async fn load_one(pool: &SqlitePool, task: Task) -> Result<TaskDetail> {
		Self::load(pool, vec![task])
			.await?
			.pop()
			.ok_or_else(|| Error::Internal("task detail missing".to_string()))
	}
}
