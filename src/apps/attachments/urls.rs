use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

/// Routes under `/api/attachments`.
pub fn url_patterns(state: AppState) -> Router {
	Router::new().delete("/{id}", view(state, views::destroy))
}

/// Routes under `/api/tasks/{id}/attachments`.
pub fn nested_patterns(state: AppState) -> Router {
	Router::new()
		.get("/", view(state.clone(), views::list))
		.post("/", view(state, views::create))
}
