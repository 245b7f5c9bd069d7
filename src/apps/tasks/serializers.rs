use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use taskflow_core::exception::{Error, Result};
use taskflow_core::permissions::TaskChange;
use validator::Validate;

use super::models::{TaskPriority, TaskStatus};

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
///
/// # Examples
///
/// ```
/// use taskflow::apps::tasks::serializers::parse_date;
///
/// assert_eq!(
///     parse_date("dueDate", "2024-03-01").unwrap().to_rfc3339(),
///     "2024-03-01T00:00:00+00:00"
/// );
/// assert!(parse_date("dueDate", "2024-03-01T12:30:00Z").is_ok());
/// assert!(parse_date("dueDate", "next tuesday").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>> {
	if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
		return Ok(timestamp.with_timezone(&Utc));
	}
	NaiveDate::parse_from_str(value, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|naive| naive.and_utc())
		.ok_or_else(|| Error::Validation(vec![format!("{field} must be a valid ISO 8601 date string")]))
}

/// Distinguishes an absent field from an explicit `null`.
fn some<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
	#[validate(length(min = 1, message = "title should not be empty"))]
	pub title: String,
	pub description: Option<String>,
	pub status: Option<TaskStatus>,
	pub priority: Option<TaskPriority>,
	pub due_date: Option<String>,
	pub position: Option<i64>,
	pub project_id: String,
	#[serde(default)]
	pub assignee_ids: Vec<String>,
	#[serde(default)]
	pub label_ids: Vec<String>,
}

/// Partial task update. `dueDate: null` clears the due date.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
	#[validate(length(min = 1, message = "title should not be empty"))]
	pub title: Option<String>,
	pub description: Option<String>,
	pub status: Option<TaskStatus>,
	pub priority: Option<TaskPriority>,
	#[serde(default, deserialize_with = "some")]
	pub due_date: Option<Option<String>>,
	pub position: Option<i64>,
	pub label_ids: Option<Vec<String>>,
}

impl UpdateTaskRequest {
	/// Which groups of fields the request touches.
	pub fn change(&self) -> TaskChange {
		TaskChange {
			status: self.status.is_some(),
			other_fields: self.title.is_some()
				|| self.description.is_some()
				|| self.priority.is_some()
				|| self.due_date.is_some()
				|| self.position.is_some()
				|| self.label_ids.is_some(),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
	pub user_id: String,
}
