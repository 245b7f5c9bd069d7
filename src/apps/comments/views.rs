use hyper::StatusCode;
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::services::{self, CommentRequest};
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// GET /api/tasks/{id}/comments
pub async fn list(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let comments = services::list(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &comments)
}

/// POST /api/tasks/{id}/comments
pub async fn create(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: CommentRequest = request.json()?;
	payload.validate()?;

	let comment = services::create(&state.pool, &state.dispatcher, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::CREATED, &comment)
}

/// PATCH /api/comments/{id}
pub async fn update(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: CommentRequest = request.json()?;
	payload.validate()?;

	let comment = services::update(&state.pool, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::OK, &comment)
}

/// DELETE /api/comments/{id}
pub async fn destroy(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}
