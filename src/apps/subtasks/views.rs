use hyper::StatusCode;
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::services::{self, CreateSubtaskRequest, UpdateSubtaskRequest};
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// GET /api/tasks/{id}/subtasks
pub async fn list(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let subtasks = services::list(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &subtasks)
}

/// POST /api/tasks/{id}/subtasks
pub async fn create(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: CreateSubtaskRequest = request.json()?;
	payload.validate()?;

	let subtask = services::create(&state.pool, &state.dispatcher, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::CREATED, &subtask)
}

/// PATCH /api/subtasks/{id}
pub async fn update(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: UpdateSubtaskRequest = request.json()?;
	payload.validate()?;

	let subtask = services::update(&state.pool, &state.dispatcher, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::OK, &subtask)
}

/// DELETE /api/subtasks/{id}
pub async fn destroy(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}
