//! Loads the inputs of the authorization rules from storage.
//!
//! Resolution order is fixed: the project must exist (`404`) before
//! membership is considered (`403`).

use sqlx::SqlitePool;
use taskflow_core::exception::Result;
use taskflow_core::permissions::{Action, Caller, MemberRole, MembershipSnapshot, Role, authorize, role_of};

use super::models::Project;

/// A project together with the caller's role in it.
#[derive(Debug, Clone)]
pub struct ProjectAccess {
	pub project: Project,
	pub role: Role,
}

/// Every membership row of `project_id`.
pub async fn membership(pool: &SqlitePool, project_id: &str) -> Result<MembershipSnapshot> {
	let rows: Vec<(String, MemberRole)> =
		sqlx::query_as("SELECT user_id, role FROM project_members WHERE project_id = ?")
			.bind(project_id)
			.fetch_all(pool)
			.await?;
	Ok(rows.into_iter().collect())
}

/// The project and the caller's role in it, if any.
pub async fn resolve(pool: &SqlitePool, caller: &Caller, project_id: &str) -> Result<(Project, Option<Role>)> {
	let project = Project::get(pool, project_id).await?;
	let snapshot = membership(pool, project_id).await?;
	let role = role_of(caller, &project.owner_id, &snapshot);
	Ok((project, role))
}

/// Load the project and gate `action` on the caller's role.
pub async fn require(pool: &SqlitePool, caller: &Caller, project_id: &str, action: Action) -> Result<ProjectAccess> {
	let (project, role) = resolve(pool, caller, project_id).await?;
	let role = authorize(role, action)?;
	Ok(ProjectAccess { project, role })
}

/// Whether `user_id` owns or is a member of `project`.
pub async fn is_participant(pool: &SqlitePool, project: &Project, user_id: &str) -> Result<bool> {
	if project.owner_id == user_id {
		return Ok(true);
	}
	let (count,): (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM project_members WHERE project_id = ? AND user_id = ?")
			.bind(&project.id)
			.bind(user_id)
			.fetch_one(pool)
			.await?;
	Ok(count > 0)
}

/// Ids of the projects the caller can read. `None` means every project.
pub async fn accessible_project_ids(pool: &SqlitePool, caller: &Caller) -> Result<Option<Vec<String>>> {
	if caller.is_admin() {
		return Ok(None);
	}
	let rows: Vec<(String,)> = sqlx::query_as(
		"SELECT id FROM projects WHERE owner_id = ?1
		 UNION
		 SELECT project_id FROM project_members WHERE user_id = ?1",
	)
	.bind(&caller.id)
	.fetch_all(pool)
	.await?;
	Ok(Some(rows.into_iter().map(|(id,)| id).collect()))
}
