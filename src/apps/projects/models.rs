use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};
use taskflow_core::permissions::{MemberRole, UserRole};

use crate::apps::auth::UserSummary;
use crate::apps::tasks::models::{Task, TaskDetail};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
	pub id: String,
	pub name: String,
	pub description: Option<String>,
	pub color: Option<String>,
	pub is_archived: bool,
	pub owner_id: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Project {
	pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<Project>> {
		Ok(sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?)
	}

	pub async fn get(pool: &SqlitePool, id: &str) -> Result<Project> {
		Self::find(pool, id)
			.await?
			.ok_or_else(|| Error::NotFound("Project not found".to_string()))
	}

	pub fn summary(&self) -> ProjectSummary {
		ProjectSummary {
			id: self.id.clone(),
			name: self.name.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProjectSummary {
	pub id: String,
	pub name: String,
}

impl ProjectSummary {
	pub async fn load_many(pool: &SqlitePool, ids: &[String]) -> Result<HashMap<String, ProjectSummary>> {
		let rows: Vec<ProjectSummary> =
			crate::db::fetch_in(pool, "SELECT id, name FROM projects WHERE id IN (", ")", ids).await?;
		Ok(rows.into_iter().map(|p| (p.id.clone(), p)).collect())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
	pub id: String,
	pub project_id: String,
	pub user_id: String,
	pub role: MemberRole,
	pub joined_at: DateTime<Utc>,
}

impl ProjectMember {
	pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<ProjectMember>> {
		Ok(sqlx::query_as::<_, ProjectMember>("SELECT * FROM project_members WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?)
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MemberRow {
	id: String,
	project_id: String,
	user_id: String,
	role: MemberRole,
	joined_at: DateTime<Utc>,
	email: String,
	first_name: String,
	last_name: String,
	avatar: Option<String>,
	user_role: UserRole,
}

/// Account fields shown next to a membership.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUser {
	pub id: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub avatar: Option<String>,
	pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWithUser {
	pub id: String,
	pub project_id: String,
	pub user_id: String,
	pub role: MemberRole,
	pub joined_at: DateTime<Utc>,
	pub user: MemberUser,
}

impl From<MemberRow> for MemberWithUser {
	fn from(row: MemberRow) -> Self {
		Self {
			user: MemberUser {
				id: row.user_id.clone(),
				email: row.email,
				first_name: row.first_name,
				last_name: row.last_name,
				avatar: row.avatar,
				role: row.user_role,
			},
			id: row.id,
			project_id: row.project_id,
			user_id: row.user_id,
			role: row.role,
			joined_at: row.joined_at,
		}
	}
}

impl MemberWithUser {
	/// Members of each project in `project_ids`, oldest membership first.
	pub async fn load_many(pool: &SqlitePool, project_ids: &[String]) -> Result<Vec<MemberWithUser>> {
		let rows: Vec<MemberRow> = crate::db::fetch_in(
			pool,
			"SELECT m.id, m.project_id, m.user_id, m.role, m.joined_at,
				u.email, u.first_name, u.last_name, u.avatar, u.role AS user_role
			 FROM project_members m JOIN users u ON u.id = m.user_id
			 WHERE m.project_id IN (",
			") ORDER BY m.joined_at ASC, m.rowid ASC",
			project_ids,
		)
		.await?;
		Ok(rows.into_iter().map(MemberWithUser::from).collect())
	}
}

/// A project with its owner, members and tasks.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
	#[serde(flatten)]
	pub project: Project,
	pub owner: Option<UserSummary>,
	pub members: Vec<MemberWithUser>,
	pub tasks: Vec<TaskDetail>,
}

impl ProjectDetail {
	/// Attach related rows to `projects`, keeping their order.
	pub async fn load(pool: &SqlitePool, projects: Vec<Project>) -> Result<Vec<ProjectDetail>> {
		let ids: Vec<String> = projects.iter().map(|p| p.id.clone()).collect();
		let owner_ids: Vec<String> = projects.iter().map(|p| p.owner_id.clone()).collect();

		let owners = UserSummary::load_many(pool, &owner_ids).await?;
		let mut members: HashMap<String, Vec<MemberWithUser>> = HashMap::new();
		for member in MemberWithUser::load_many(pool, &ids).await? {
			members.entry(member.project_id.clone()).or_default().push(member);
		}

		let tasks: Vec<Task> = crate::db::fetch_in(
			pool,
			"SELECT * FROM tasks WHERE project_id IN (",
			") ORDER BY position ASC, created_at DESC, rowid DESC",
			&ids,
		)
		.await?;
		let mut tasks_by_project: HashMap<String, Vec<TaskDetail>> = HashMap::new();
		for task in TaskDetail::load(pool, tasks).await? {
			tasks_by_project
				.entry(task.task.project_id.clone())
				.or_default()
				.push(task);
		}

		Ok(projects
			.into_iter()
			.map(|project| ProjectDetail {
				owner: owners.get(&project.owner_id).cloned(),
				members: members.remove(&project.id).unwrap_or_default(),
				tasks: tasks_by_project.remove(&project.id).unwrap_or_default(),
				project,
			})
			.collect())
	}
}
