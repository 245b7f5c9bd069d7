use hyper::StatusCode;
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::models::CreateAttachmentRequest;
use super::services;
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// GET /api/tasks/{id}/attachments
pub async fn list(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let attachments = services::list(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &attachments)
}

/// POST /api/tasks/{id}/attachments
pub async fn create(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: CreateAttachmentRequest = request.json()?;
	payload.validate()?;

	let attachment = services::create(&state.pool, &state.dispatcher, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::CREATED, &attachment)
}

/// DELETE /api/attachments/{id}
pub async fn destroy(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete(&state.pool, &state.dispatcher, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}
