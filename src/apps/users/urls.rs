use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.get("/", view(state.clone(), views::list))
		.get("/profile", view(state.clone(), views::profile))
		.patch("/profile", view(state.clone(), views::update_profile))
		.post("/change-password", view(state.clone(), views::change_password))
		.delete("/account", view(state.clone(), views::delete_account))
		.delete("/{id}", view(state, views::destroy))
}
