use hyper::StatusCode;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};

use super::services::{self, CommentSearchParams, TaskSearchParams};
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// GET /api/search/tasks
pub async fn tasks(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let params: TaskSearchParams = request.query()?;
	let results = services::search_tasks(&state.pool, user, params).await?;
	Response::json(StatusCode::OK, &results)
}

/// GET /api/search/comments
pub async fn comments(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let params: CommentSearchParams = request.query()?;
	let results = services::search_comments(&state.pool, user, params).await?;
	Response::json(StatusCode::OK, &results)
}
