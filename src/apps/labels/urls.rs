use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.get("/", view(state.clone(), views::list))
		.post("/", view(state.clone(), views::create))
		.patch("/{id}", view(state.clone(), views::update))
		.delete("/{id}", view(state.clone(), views::destroy))
		.post("/attach/{taskId}/{labelId}", view(state.clone(), views::attach))
		.delete("/attach/{taskId}/{labelId}", view(state, views::detach))
}
