use hyper::StatusCode;
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::services::{self, CreateLabelRequest, UpdateLabelRequest};
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// GET /api/labels
pub async fn list(_request: Request, state: AppState) -> Result<Response> {
	let labels = services::list(&state.pool).await?;
	Response::json(StatusCode::OK, &labels)
}

/// POST /api/labels
pub async fn create(request: Request, state: AppState) -> Result<Response> {
	let payload: CreateLabelRequest = request.json()?;
	payload.validate()?;

	let label = services::create(&state.pool, payload).await?;
	Response::json(StatusCode::CREATED, &label)
}

/// PATCH /api/labels/{id}
pub async fn update(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: UpdateLabelRequest = request.json()?;
	payload.validate()?;

	let label = services::update(&state.pool, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::OK, &label)
}

/// DELETE /api/labels/{id}
pub async fn destroy(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}

/// POST /api/labels/attach/{taskId}/{labelId}
pub async fn attach(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let task = services::attach(
		&state.pool,
		&state.dispatcher,
		user,
		request.param("taskId")?,
		request.param("labelId")?,
	)
	.await?;
	Response::json(StatusCode::CREATED, &task)
}

/// DELETE /api/labels/attach/{taskId}/{labelId}
pub async fn detach(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let task = services::detach(
		&state.pool,
		&state.dispatcher,
		user,
		request.param("taskId")?,
		request.param("labelId")?,
	)
	.await?;
	Response::json(StatusCode::OK, &task)
}
