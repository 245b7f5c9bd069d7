use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.post("/", view(state.clone(), views::create))
		.get("/", view(state.clone(), views::list))
		.get("/check-name/{name}", view(state.clone(), views::check_name))
		.get("/{id}", view(state.clone(), views::retrieve))
		.patch("/{id}", view(state.clone(), views::update))
		.delete("/{id}", view(state.clone(), views::destroy))
		.patch("/{id}/archive", view(state.clone(), views::archive))
		.patch("/{id}/unarchive", view(state.clone(), views::unarchive))
		.get("/{id}/members", view(state.clone(), views::members))
		.post("/{id}/members", view(state.clone(), views::add_member))
		.patch("/{id}/members/{memberId}", view(state.clone(), views::update_member))
		.delete("/{id}/members/{memberId}", view(state.clone(), views::remove_member))
		.get("/{id}/assignable-users", view(state, views::assignable_users))
}
