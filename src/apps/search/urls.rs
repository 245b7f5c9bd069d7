use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.get("/tasks", view(state.clone(), views::tasks))
		.get("/comments", view(state, views::comments))
}
