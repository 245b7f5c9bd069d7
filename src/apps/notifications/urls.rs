use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.get("/", view(state.clone(), views::list))
		.get("/unread-count", view(state.clone(), views::unread_count))
		.patch("/read-all", view(state.clone(), views::mark_all_read))
		.patch("/{id}/read", view(state.clone(), views::mark_read))
		.delete("/{id}", view(state, views::delete))
}
