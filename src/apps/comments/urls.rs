use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

/// Routes under `/api/comments`.
pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.patch("/{id}", view(state.clone(), views::update))
		.delete("/{id}", view(state, views::destroy))
}

/// Routes under `/api/tasks/{id}/comments`.
pub fn nested_patterns(state: AppState) -> Router {
	Router::new()
		.get("/", view(state.clone(), views::list))
		.post("/", view(state, views::create))
}
