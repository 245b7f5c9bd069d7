use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};
use taskflow_core::pagination::{PageQuery, Paginated};

use super::models::Notification;

fn not_found() -> Error {
	Error::NotFound("Notification not found".to_string())
}

/// Notifications of `user_id`, newest first.
pub async fn list(
	pool: &SqlitePool,
	user_id: &str,
	unread_only: bool,
	query: PageQuery,
) -> Result<Paginated<Notification>> {
	let filter = if unread_only {
		"user_id = ? AND is_read = 0"
	} else {
		"user_id = ?"
	};

	let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM notifications WHERE {filter}"))
		.bind(user_id)
		.fetch_one(pool)
		.await?;
	let rows = sqlx::query_as::<_, Notification>(&format!(
		"SELECT * FROM notifications WHERE {filter}
		 ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
	))
	.bind(user_id)
	.bind(query.limit())
	.bind(query.offset())
	.fetch_all(pool)
	.await?;

	Ok(Paginated::new(rows, total, query))
}

/// The notification `id` if it belongs to `user_id`.
///
/// Another user's notification is reported as missing.
pub async fn get_owned(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Notification> {
	sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
		.bind(id)
		.fetch_optional(pool)
		.await?
		.filter(|notification| notification.user_id == user_id)
		.ok_or_else(not_found)
}

/// Mark one notification read. Already-read notifications are returned
/// unchanged.
pub async fn mark_read(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Notification> {
	let notification = get_owned(pool, user_id, id).await?;
	if notification.is_read {
		return Ok(notification);
	}
	Ok(
		sqlx::query_as::<_, Notification>("UPDATE notifications SET is_read = 1 WHERE id = ? RETURNING *")
			.bind(id)
			.fetch_one(pool)
			.await?,
	)
}

/// Mark every unread notification of `user_id` read and return the ids
/// that changed.
pub async fn mark_all_read(pool: &SqlitePool, user_id: &str) -> Result<Vec<String>> {
	let rows: Vec<(String,)> = sqlx::query_as(
		"UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0 RETURNING id",
	)
	.bind(user_id)
	.fetch_all(pool)
	.await?;
	Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn delete(pool: &SqlitePool, user_id: &str, id: &str) -> Result<()> {
	get_owned(pool, user_id, id).await?;
	sqlx::query("DELETE FROM notifications WHERE id = ?")
		.bind(id)
		.execute(pool)
		.await?;
	Ok(())
}
