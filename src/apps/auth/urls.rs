use taskflow_http::{Router, view};

use super::views;
use crate::config::state::AppState;

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.post("/register", view(state.clone(), views::register))
		.post("/login", view(state.clone(), views::login))
		.post("/logout", view(state.clone(), views::logout))
		.get("/me", view(state, views::me))
}
