use chrono::Utc;
use serde_json::{Map, Value, json};
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};
use taskflow_core::permissions::{Action, MemberRole};

use super::access;
use super::models::{MemberWithUser, Project, ProjectDetail, ProjectMember};
use super::serializers::{AddMemberRequest, CreateProjectRequest, UpdateProjectRequest};
use crate::apps::activity::NewActivity;
use crate::apps::auth::{User, UserSummary};
use crate::apps::notifications::{Dispatcher, Notice, NotificationType};

fn admin_only(actor: &User) -> Result<()> {
	if actor.is_admin() {
		Ok(())
	} else {
		Err(Error::Forbidden("Only admins can manage projects".to_string()))
	}
}

async fn require_user(pool: &SqlitePool, user_id: &str) -> Result<User> {
	User::find(pool, user_id)
		.await?
		.ok_or_else(|| Error::NotFound("User not found".to_string()))
}

/// Create a project owned by `ownerId` (or the caller) and seed its
/// memberships.
pub async fn create(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	payload: CreateProjectRequest,
) -> Result<ProjectDetail> {
	admin_only(actor)?;
	let owner_id = payload.owner_id.clone().unwrap_or_else(|| actor.id.clone());
	require_user(pool, &owner_id).await?;

	let now = Utc::now();
	let project_id = crate::db::new_id();
	let mut tx = pool.begin().await?;

	let project = sqlx::query_as::<_, Project>(
		"INSERT INTO projects (id, name, description, color, is_archived, owner_id, created_at, updated_at)
		 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
		 RETURNING *",
	)
	.bind(&project_id)
	.bind(&payload.name)
	.bind(&payload.description)
	.bind(&payload.color)
	.bind(payload.is_archived.unwrap_or(false))
	.bind(&owner_id)
	.bind(now)
	.bind(now)
	.fetch_one(&mut *tx)
	.await?;

	let seeded = std::iter::once((&owner_id, MemberRole::Owner))
		.chain(payload.editors.iter().map(|id| (id, MemberRole::Editor)))
		.chain(payload.viewers.iter().map(|id| (id, MemberRole::Viewer)));
	for (user_id, role) in seeded {
		// First role listed for a user wins
		sqlx::query(
			"INSERT OR IGNORE INTO project_members (id, project_id, user_id, role, joined_at)
			 VALUES (?, ?, ?, ?, ?)",
		)
		.bind(crate::db::new_id())
		.bind(&project_id)
		.bind(user_id)
		.bind(role)
		.bind(now)
		.execute(&mut *tx)
		.await?;
	}
	tx.commit().await?;
	tracing::info!(project_id = %project.id, owner_id = %owner_id, "project created");

	dispatcher
		.record(
			NewActivity::new("created", "Project", &project.id)
				.by(&actor.id)
				.in_project(&project.id)
				.with_metadata(json!({ "name": project.name })),
		)
		.await;

	detail(pool, project).await
}

async fn detail(pool: &SqlitePool, project: Project) -> Result<ProjectDetail> {
	ProjectDetail::load(pool, vec![project])
		.await?
		.pop()
		.ok_or_else(|| Error::Internal("project detail missing".to_string()))
}

/// Every project for admins, otherwise owned or joined projects. Newest
/// first.
pub async fn list(pool: &SqlitePool, actor: &User) -> Result<Vec<ProjectDetail>> {
	let projects = if actor.is_admin() {
		sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC, rowid DESC")
			.fetch_all(pool)
			.await?
	} else {
		sqlx::query_as::<_, Project>(
			"SELECT * FROM projects
			 WHERE owner_id = ?1
			    OR id IN (SELECT project_id FROM project_members WHERE user_id = ?1)
			 ORDER BY created_at DESC, rowid DESC",
		)
		.bind(&actor.id)
		.fetch_all(pool)
		.await?
	};
	ProjectDetail::load(pool, projects).await
}

pub async fn get(pool: &SqlitePool, actor: &User, id: &str) -> Result<ProjectDetail> {
	let access = access::require(pool, &actor.caller(), id, Action::Read).await?;
	detail(pool, access.project).await
}

pub async fn update(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	id: &str,
	payload: UpdateProjectRequest,
) -> Result<Project> {
	let access = access::require(pool, &actor.caller(), id, Action::UpdateProject).await?;
	let before = access.project;

	let updated = sqlx::query_as::<_, Project>(
		"UPDATE projects SET
			name = COALESCE(?, name),
			description = COALESCE(?, description),
			color = COALESCE(?, color),
			is_archived = COALESCE(?, is_archived),
			updated_at = ?
		 WHERE id = ?
		 RETURNING *",
	)
	.bind(&payload.name)
	.bind(&payload.description)
	.bind(&payload.color)
	.bind(payload.is_archived)
	.bind(Utc::now())
	.bind(id)
	.fetch_one(pool)
	.await?;

	let mut changes = Map::new();
	if let Some(name) = &payload.name {
		changes.insert("name".into(), json!(name));
	}
	if let Some(description) = &payload.description {
		changes.insert("description".into(), json!(description));
	}
	if let Some(color) = &payload.color {
		changes.insert("color".into(), json!(color));
	}
	if let Some(is_archived) = payload.is_archived {
		changes.insert("isArchived".into(), json!(is_archived));
	}
	dispatcher
		.record(
			NewActivity::new("updated", "Project", id)
				.by(&actor.id)
				.in_project(id)
				.with_metadata(json!({ "name": before.name, "changes": Value::Object(changes) })),
		)
		.await;

	Ok(updated)
}

pub async fn set_archived(pool: &SqlitePool, actor: &User, id: &str, is_archived: bool) -> Result<Project> {
	admin_only(actor)?;
	Project::get(pool, id).await?;
	Ok(sqlx::query_as::<_, Project>(
		"UPDATE projects SET is_archived = ?, updated_at = ? WHERE id = ? RETURNING *",
	)
	.bind(is_archived)
	.bind(Utc::now())
	.bind(id)
	.fetch_one(pool)
	.await?)
}

/// Delete a project. Tasks, memberships and activity go with it.
pub async fn delete(pool: &SqlitePool, actor: &User, id: &str) -> Result<()> {
	admin_only(actor)?;
	Project::get(pool, id).await?;
	sqlx::query("DELETE FROM projects WHERE id = ?")
		.bind(id)
		.execute(pool)
		.await?;
	tracing::info!(project_id = %id, "project deleted");
	Ok(())
}

pub async fn list_members(pool: &SqlitePool, actor: &User, id: &str) -> Result<Vec<MemberWithUser>> {
	access::require(pool, &actor.caller(), id, Action::Read).await?;
	MemberWithUser::load_many(pool, &[id.to_string()]).await
}

pub async fn add_member(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	id: &str,
	payload: AddMemberRequest,
) -> Result<ProjectMember> {
	let access = access::require(pool, &actor.caller(), id, Action::ManageMembers).await?;
	require_user(pool, &payload.user_id).await?;

	let member = sqlx::query_as::<_, ProjectMember>(
		"INSERT INTO project_members (id, project_id, user_id, role, joined_at)
		 VALUES (?, ?, ?, ?, ?)
		 RETURNING *",
	)
	.bind(crate::db::new_id())
	.bind(id)
	.bind(&payload.user_id)
	.bind(payload.role)
	.bind(Utc::now())
	.fetch_one(pool)
	.await
	.map_err(|err| match Error::from(err) {
		Error::Conflict(_) => Error::Conflict("User is already a member of this project".to_string()),
		other => other,
	})?;

	dispatcher
		.record(
			NewActivity::new("added_member", "Project", id)
				.by(&actor.id)
				.in_project(id)
				.with_metadata(json!({ "memberId": member.user_id, "role": member.role })),
		)
		.await;
	if member.user_id != actor.id {
		let notice = Notice::new(
			NotificationType::ProjectInvite,
			actor.display_name(),
			&access.project.name,
			id,
		);
		dispatcher.notify(&member.user_id, &notice).await;
	}

	Ok(member)
}

async fn member_of(pool: &SqlitePool, project_id: &str, member_id: &str) -> Result<ProjectMember> {
	ProjectMember::find(pool, member_id)
		.await?
		.filter(|member| member.project_id == project_id)
		.ok_or_else(|| Error::NotFound("Member not found".to_string()))
}

pub async fn update_member(
	pool: &SqlitePool,
	actor: &User,
	id: &str,
	member_id: &str,
	role: MemberRole,
) -> Result<ProjectMember> {
	access::require(pool, &actor.caller(), id, Action::ManageMembers).await?;
	member_of(pool, id, member_id).await?;
	Ok(
		sqlx::query_as::<_, ProjectMember>("UPDATE project_members SET role = ? WHERE id = ? RETURNING *")
			.bind(role)
			.bind(member_id)
			.fetch_one(pool)
			.await?,
	)
}

pub async fn remove_member(
	pool: &SqlitePool,
	dispatcher: &Dispatcher,
	actor: &User,
	id: &str,
	member_id: &str,
) -> Result<()> {
	access::require(pool, &actor.caller(), id, Action::ManageMembers).await?;
	let member = member_of(pool, id, member_id).await?;
	sqlx::query("DELETE FROM project_members WHERE id = ?")
		.bind(member_id)
		.execute(pool)
		.await?;

	dispatcher
		.record(
			NewActivity::new("removed_member", "Project", id)
				.by(&actor.id)
				.in_project(id)
				.with_metadata(json!({ "memberId": member.user_id, "role": member.role })),
		)
		.await;
	Ok(())
}

/// The owner followed by every member, each once.
pub async fn assignable_users(pool: &SqlitePool, actor: &User, id: &str) -> Result<Vec<UserSummary>> {
	let access = access::require(pool, &actor.caller(), id, Action::Read).await?;
	let rows: Vec<UserSummary> = sqlx::query_as(
		"SELECT id, email, first_name, last_name, avatar FROM users WHERE id = ?1
		 UNION
		 SELECT u.id, u.email, u.first_name, u.last_name, u.avatar
		 FROM project_members m JOIN users u ON u.id = m.user_id
		 WHERE m.project_id = ?2",
	)
	.bind(&access.project.owner_id)
	.bind(id)
	.fetch_all(pool)
	.await?;

	let (mut owner, mut others): (Vec<_>, Vec<_>) =
		rows.into_iter().partition(|user| user.id == access.project.owner_id);
	others.sort_by(|a, b| a.first_name.cmp(&b.first_name).then(a.last_name.cmp(&b.last_name)));
	owner.append(&mut others);
	Ok(owner)
}

/// Whether another project already uses `name`, ignoring case.
pub async fn name_exists(pool: &SqlitePool, name: &str, exclude_id: Option<&str>) -> Result<bool> {
	let (count,): (i64,) = sqlx::query_as(
		"SELECT COUNT(*) FROM projects WHERE LOWER(name) = LOWER(?) AND (? IS NULL OR id <> ?)",
	)
	.bind(name)
	.bind(exclude_id)
	.bind(exclude_id)
	.fetch_one(pool)
	.await?;
	Ok(count > 0)
}
