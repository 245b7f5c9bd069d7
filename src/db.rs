//! SQLite pool and schema migrations.

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::config::settings::Settings;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a pool for `url` with foreign-key enforcement on every connection.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(max_connections)
		.connect_with(options)
		.await
}

pub async fn connect_with_settings(settings: &Settings) -> Result<SqlitePool, sqlx::Error> {
	connect(&settings.database_url, settings.database_max_connections).await
}

/// Apply pending migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
	MIGRATOR.run(pool).await?;
	tracing::info!("database migrations applied");
	Ok(())
}

/// New primary key.
pub fn new_id() -> String {
	uuid::Uuid::new_v4().to_string()
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
///
/// Use together with `ESCAPE '\'`.
///
/// # Examples
///
/// ```
/// use taskflow::db::like_pattern;
///
/// assert_eq!(like_pattern("login"), "%login%");
/// assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn like_pattern(needle: &str) -> String {
	let mut escaped = String::with_capacity(needle.len() + 2);
	escaped.push('%');
	for c in needle.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped.push('%');
	escaped
}

/// Run `prefix ?, ?, ... suffix` with one bind per id.
///
/// `prefix` ends with the opening `IN (` and `suffix` starts with its
/// closing parenthesis. An empty `ids` slice returns no rows without
/// touching the database.
pub async fn fetch_in<T>(pool: &SqlitePool, prefix: &str, suffix: &str, ids: &[String]) -> Result<Vec<T>, sqlx::Error>
where
	T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}
	let mut builder = QueryBuilder::<Sqlite>::new(prefix);
	let mut separated = builder.separated(", ");
	for id in ids {
		separated.push_bind(id.clone());
	}
	builder.push(suffix);
	builder.build_query_as::<T>().fetch_all(pool).await
}
