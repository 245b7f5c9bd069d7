//! Query-string filters shared by the task listings and search.

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};
use taskflow_core::exception::Result;
use taskflow_core::pagination::PageQuery;

use super::models::{TaskPriority, TaskStatus};
use super::serializers::parse_date;
use crate::db::like_pattern;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
	pub status: Option<TaskStatus>,
	pub priority: Option<TaskPriority>,
	pub assignee_id: Option<String>,
	pub label_id: Option<String>,
	pub search: Option<String>,
	pub due_from: Option<String>,
	pub due_to: Option<String>,
	pub page: Option<i64>,
	pub limit: Option<i64>,
}

impl TaskFilter {
	pub fn page_query(&self) -> Result<PageQuery> {
		PageQuery::new(self.page, self.limit)
	}

	/// Append ` AND ...` conditions on the task alias `t`.
	pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> Result<()> {
		if let Some(status) = self.status {
			builder.push(" AND t.status = ").push_bind(status);
		}
		if let Some(priority) = self.priority {
			builder.push(" AND t.priority = ").push_bind(priority);
		}
		if let Some(assignee_id) = &self.assignee_id {
			builder
				.push(" AND t.id IN (SELECT task_id FROM task_assignees WHERE user_id = ")
				.push_bind(assignee_id.clone())
				.push(")");
		}
		if let Some(label_id) = &self.label_id {
			builder
				.push(" AND t.id IN (SELECT task_id FROM task_labels WHERE label_id = ")
				.push_bind(label_id.clone())
				.push(")");
		}
		if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
			let pattern = like_pattern(search);
			builder
				.push(" AND (t.title LIKE ")
				.push_bind(pattern.clone())
				.push(" ESCAPE '\\' OR t.description LIKE ")
				.push_bind(pattern)
				.push(" ESCAPE '\\')");
		}
		if let Some(from) = &self.due_from {
			builder
				.push(" AND t.due_date >= ")
				.push_bind(parse_date("dueFrom", from)?);
		}
		if let Some(to) = &self.due_to {
			builder
				.push(" AND t.due_date <= ")
				.push_bind(parse_date("dueTo", to)?);
		}
		Ok(())
	}
}
