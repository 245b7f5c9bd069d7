use chrono::Utc;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};

use super::serializers::{ChangePasswordRequest, UpdateProfileRequest};
use crate::apps::auth::{PasswordHasher, User, UserProfile};

fn admin_only(actor: &User) -> Result<()> {
	if actor.is_admin() {
		Ok(())
	} else {
		Err(Error::Forbidden("Admin access required".to_string()))
	}
}

async fn require_user(pool: &SqlitePool, id: &str) -> Result<User> {
	User::find(pool, id)
		.await?
		.ok_or_else(|| Error::NotFound("User not found".to_string()))
}

/// Every account, newest first.
pub async fn list(pool: &SqlitePool, actor: &User) -> Result<Vec<UserProfile>> {
	admin_only(actor)?;
	let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, rowid DESC")
		.fetch_all(pool)
		.await?;
	Ok(users.iter().map(User::profile).collect())
}

pub async fn profile(pool: &SqlitePool, user_id: &str) -> Result<UserProfile> {
	Ok(require_user(pool, user_id).await?.profile())
}

pub async fn update_profile(pool: &SqlitePool, user_id: &str, payload: UpdateProfileRequest) -> Result<UserProfile> {
	require_user(pool, user_id).await?;

	// NULL keeps the current avatar, '' clears it
	let user = sqlx::query_as::<_, User>(
		"UPDATE users SET
			first_name = COALESCE(?, first_name),
			last_name = COALESCE(?, last_name),
			avatar = CASE WHEN ? IS NULL THEN avatar ELSE NULLIF(?, '') END,
			updated_at = ?
		 WHERE id = ?
		 RETURNING *",
	)
	.bind(&payload.first_name)
	.bind(&payload.last_name)
	.bind(&payload.avatar)
	.bind(&payload.avatar)
	.bind(Utc::now())
	.bind(user_id)
	.fetch_one(pool)
	.await?;
	Ok(user.profile())
}

pub async fn change_password(
	pool: &SqlitePool,
	hasher: &dyn PasswordHasher,
	user_id: &str,
	payload: ChangePasswordRequest,
) -> Result<()> {
	if payload.new_password != payload.confirm_password {
		return Err(Error::BadRequest("New passwords do not match".to_string()));
	}
	let user = require_user(pool, user_id).await?;
	if !hasher.verify(&payload.current_password, &user.password_hash)? {
		return Err(Error::BadRequest("Current password is incorrect".to_string()));
	}

	let password_hash = hasher.hash(&payload.new_password)?;
	sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
		.bind(password_hash)
		.bind(Utc::now())
		.bind(user_id)
		.execute(pool)
		.await?;
	tracing::info!(user_id, "password changed");
	Ok(())
}

/// Remove an account. Owned projects, tasks, comments, memberships and
/// notifications go with it; activity rows keep a NULL actor.
pub async fn delete_account(pool: &SqlitePool, user_id: &str) -> Result<()> {
	require_user(pool, user_id).await?;
	sqlx::query("DELETE FROM users WHERE id = ?")
		.bind(user_id)
		.execute(pool)
		.await?;
	tracing::info!(user_id, "user deleted");
	Ok(())
}

pub async fn delete_user(pool: &SqlitePool, actor: &User, user_id: &str) -> Result<()> {
	admin_only(actor)?;
	delete_account(pool, user_id).await
}
