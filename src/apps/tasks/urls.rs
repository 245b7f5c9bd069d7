use taskflow_http::{Router, view};

use super::views;
use crate::apps::{attachments, comments, subtasks};
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.post("/", view(state.clone(), views::create))
		.get("/my-tasks", view(state.clone(), views::my_tasks))
		.get("/project/{projectId}", view(state.clone(), views::project_tasks))
		.get("/{id}", view(state.clone(), views::retrieve))
		.patch("/{id}", view(state.clone(), views::update))
		.delete("/{id}", view(state.clone(), views::destroy))
		.post("/{id}/assign", view(state.clone(), views::assign))
		.delete("/{id}/assign/{userId}", view(state.clone(), views::unassign))
		.include("/{id}/subtasks", subtasks::urls::nested_patterns(state.clone()))
		.include("/{id}/comments", comments::urls::nested_patterns(state.clone()))
		.include("/{id}/attachments", attachments::urls::nested_patterns(state))
}
