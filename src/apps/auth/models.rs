use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use taskflow_core::exception::Result;
use taskflow_core::permissions::{Caller, UserRole};

/// Account row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
	pub id: String,
	pub email: String,
	pub password_hash: String,
	pub first_name: String,
	pub last_name: String,
	pub avatar: Option<String>,
	pub role: UserRole,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a [`User`].
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
	pub email: &'a str,
	pub password_hash: &'a str,
	pub first_name: &'a str,
	pub last_name: &'a str,
	pub role: UserRole,
}

impl User {
	pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
		Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?)
	}

	pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
		Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
			.bind(email)
			.fetch_optional(pool)
			.await?)
	}

	pub async fn create(pool: &SqlitePool, new: NewUser<'_>) -> Result<User> {
		let now = Utc::now();
		let user = sqlx::query_as::<_, User>(
			"INSERT INTO users (id, email, password_hash, first_name, last_name, role, is_active, created_at, updated_at)
			 VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
			 RETURNING *",
		)
		.bind(crate::db::new_id())
		.bind(new.email)
		.bind(new.password_hash)
		.bind(new.first_name)
		.bind(new.last_name)
		.bind(new.role)
		.bind(now)
		.bind(now)
		.fetch_one(pool)
		.await?;
		Ok(user)
	}

	pub fn display_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}

	/// Identity used by the authorization rules.
	pub fn caller(&self) -> Caller {
		Caller::new(self.id.clone(), self.role)
	}

	pub fn is_admin(&self) -> bool {
		self.role == UserRole::Admin
	}

	pub fn summary(&self) -> UserSummary {
		UserSummary {
			id: self.id.clone(),
			email: self.email.clone(),
			first_name: self.first_name.clone(),
			last_name: self.last_name.clone(),
			avatar: self.avatar.clone(),
		}
	}

	pub fn profile(&self) -> UserProfile {
		UserProfile {
			id: self.id.clone(),
			email: self.email.clone(),
			first_name: self.first_name.clone(),
			last_name: self.last_name.clone(),
			avatar: self.avatar.clone(),
			role: self.role,
			is_active: self.is_active,
			created_at: self.created_at,
			updated_at: self.updated_at,
		}
	}
}

/// Public projection of a user embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
	pub id: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub avatar: Option<String>,
}

impl UserSummary {
	/// Summaries of `ids`, keyed by id. Unknown ids are skipped.
	pub async fn load_many(pool: &SqlitePool, ids: &[String]) -> Result<HashMap<String, UserSummary>> {
		let rows: Vec<UserSummary> = crate::db::fetch_in(
			pool,
			"SELECT id, email, first_name, last_name, avatar FROM users WHERE id IN (",
			")",
			ids,
		)
		.await?;
		Ok(rows.into_iter().map(|user| (user.id.clone(), user)).collect())
	}
}

/// A user as seen by themselves or an admin. Never carries the hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	pub id: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub avatar: Option<String>,
	pub role: UserRole,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}
