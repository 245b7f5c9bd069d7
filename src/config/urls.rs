//! Root URL configuration.

use std::sync::Arc;

use taskflow_http::{CorsMiddleware, Handler, LoggingMiddleware, MiddlewareChain, Router, view};

use super::state::AppState;
use super::views;
use crate::apps::{
	activity, attachments, auth, comments, labels, notifications, projects, search, subtasks, tasks, users,
};

pub fn url_patterns(state: AppState) -> Router {
	Router::new()
		.get("/api/health", view(state.clone(), views::health))
		.include("/api/auth", auth::urls::url_patterns(state.clone()))
		.include("/api/users", users::urls::url_patterns(state.clone()))
		.include("/api/projects", projects::urls::url_patterns(state.clone()))
		.include("/api/tasks", tasks::urls::url_patterns(state.clone()))
		.include("/api/subtasks", subtasks::urls::url_patterns(state.clone()))
		.include("/api/comments", comments::urls::url_patterns(state.clone()))
		.include("/api/attachments", attachments::urls::url_patterns(state.clone()))
		.include("/api/labels", labels::urls::url_patterns(state.clone()))
		.include("/api/notifications", notifications::urls::url_patterns(state.clone()))
		.include("/api/activities", activity::urls::url_patterns(state.clone()))
		.include("/api/search", search::urls::url_patterns(state))
}

/// The full request pipeline: logging, then CORS, then authentication,
/// then routing.
pub fn build_handler(state: AppState, cors_origin: &str) -> Arc<dyn Handler> {
	let authentication = auth::AuthenticationMiddleware::new(state.pool.clone(), state.jwt.clone());
	let chain = MiddlewareChain::new(Arc::new(url_patterns(state)))
		.with_middleware(Arc::new(LoggingMiddleware::new()))
		.with_middleware(Arc::new(CorsMiddleware::for_origin(cors_origin)))
		.with_middleware(Arc::new(authentication));
	Arc::new(chain)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_every_app_is_mounted() {
		let pool = crate::db::connect("sqlite::memory:", 1).await.unwrap();
		let jwt = Arc::new(auth::JwtAuth::new(b"url-table-test-secret", chrono::Duration::hours(1)));
		let dispatcher = notifications::Dispatcher::sqlite(
			pool.clone(),
			Arc::new(taskflow_websockets::ChannelRegistry::new()),
		);
		let state = AppState::new(pool, jwt, Arc::new(auth::Argon2Hasher::new()), dispatcher);

		assert!(url_patterns(state).len() > 50);
	}
}
