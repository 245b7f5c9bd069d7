use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::apps::auth::UserSummary;

/// An activity waiting to be recorded.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use taskflow::apps::activity::NewActivity;
///
/// let activity = NewActivity::new("created", "Task", "t1")
///     .by("u1")
///     .in_project("p1")
///     .on_task("t1")
///     .with_metadata(json!({ "title": "Write docs" }));
///
/// assert_eq!(activity.project_id.as_deref(), Some("p1"));
/// assert_eq!(activity.metadata["title"], "Write docs");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
	pub action: &'static str,
	pub entity: &'static str,
	pub entity_id: String,
	pub user_id: Option<String>,
	pub project_id: Option<String>,
	pub task_id: Option<String>,
	pub metadata: Value,
}

impl NewActivity {
	pub fn new(action: &'static str, entity: &'static str, entity_id: impl Into<String>) -> Self {
		Self {
			action,
			entity,
			entity_id: entity_id.into(),
			user_id: None,
			project_id: None,
			task_id: None,
			metadata: json!({}),
		}
	}

	pub fn by(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	pub fn in_project(mut self, project_id: impl Into<String>) -> Self {
		self.project_id = Some(project_id.into());
		self
	}

	pub fn on_task(mut self, task_id: impl Into<String>) -> Self {
		self.task_id = Some(task_id.into());
		self
	}

	pub fn with_metadata(mut self, metadata: Value) -> Self {
		self.metadata = metadata;
		self
	}
}

/// Activity row joined with its actor.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ActivityRow {
	pub id: String,
	pub action: String,
	pub entity: String,
	pub entity_id: String,
	pub user_id: Option<String>,
	pub project_id: Option<String>,
	pub task_id: Option<String>,
	pub metadata: String,
	pub created_at: DateTime<Utc>,
	pub actor_email: Option<String>,
	pub actor_first_name: Option<String>,
	pub actor_last_name: Option<String>,
	pub actor_avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
	pub id: String,
	pub action: String,
	pub entity: String,
	pub entity_id: String,
	pub user_id: Option<String>,
	pub project_id: Option<String>,
	pub task_id: Option<String>,
	pub metadata: Value,
	pub created_at: DateTime<Utc>,
	pub user: Option<UserSummary>,
}

impl From<ActivityRow> for ActivityEntry {
	fn from(row: ActivityRow) -> Self {
		let user = match (&row.user_id, row.actor_email, row.actor_first_name, row.actor_last_name) {
			(Some(id), Some(email), Some(first_name), Some(last_name)) => Some(UserSummary {
				id: id.clone(),
				email,
				first_name,
				last_name,
				avatar: row.actor_avatar,
			}),
			_ => None,
		};
		Self {
			id: row.id,
			action: row.action,
			entity: row.entity,
			entity_id: row.entity_id,
			user_id: row.user_id,
			project_id: row.project_id,
			task_id: row.task_id,
			metadata: serde_json::from_str(&row.metadata).unwrap_or_else(|_| json!({})),
			created_at: row.created_at,
			user,
		}
	}
}
