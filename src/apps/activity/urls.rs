use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.get("/project/{projectId}", view(state.clone(), views::project_activity))
		.get("/task/{taskId}", view(state, views::task_activity))
}
