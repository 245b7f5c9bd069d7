use hyper::StatusCode;
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::serializers::{
	AddMemberRequest, CheckNameParams, CreateProjectRequest, UpdateMemberRequest, UpdateProjectRequest,
};
use super::services;
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// POST /api/projects
pub async fn create(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: CreateProjectRequest = request.json()?;
	payload.validate()?;

	let project = services::create(&state.pool, &state.dispatcher, user, payload).await?;
	Response::json(StatusCode::CREATED, &project)
}

/// GET /api/projects
pub async fn list(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	Response::json(StatusCode::OK, &services::list(&state.pool, user).await?)
}

/// GET /api/projects/check-name/{name}
pub async fn check_name(request: Request, state: AppState) -> Result<Response> {
	current_user(&request)?;
	let params: CheckNameParams = request.query()?;
	let exists = services::name_exists(&state.pool, request.param("name")?, params.exclude_id.as_deref()).await?;
	Response::json(StatusCode::OK, &exists)
}

/// GET /api/projects/{id}
pub async fn retrieve(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let project = services::get(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &project)
}

/// PATCH /api/projects/{id}
pub async fn update(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: UpdateProjectRequest = request.json()?;
	payload.validate()?;

	let project = services::update(&state.pool, &state.dispatcher, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::OK, &project)
}

/// PATCH /api/projects/{id}/archive
pub async fn archive(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let project = services::set_archived(&state.pool, user, request.param("id")?, true).await?;
	Response::json(StatusCode::OK, &project)
}

/// PATCH /api/projects/{id}/unarchive
pub async fn unarchive(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let project = services::set_archived(&state.pool, user, request.param("id")?, false).await?;
	Response::json(StatusCode::OK, &project)
}

/// DELETE /api/projects/{id}
pub async fn destroy(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}

/// GET /api/projects/{id}/members
pub async fn members(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let members = services::list_members(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &members)
}

/// POST /api/projects/{id}/members
pub async fn add_member(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: AddMemberRequest = request.json()?;
	let member = services::add_member(&state.pool, &state.dispatcher, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::CREATED, &member)
}

/// PATCH /api/projects/{id}/members/{memberId}
pub async fn update_member(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: UpdateMemberRequest = request.json()?;
	let member = services::update_member(
		&state.pool,
		user,
		request.param("id")?,
		request.param("memberId")?,
		payload.role,
	)
	.await?;
	Response::json(StatusCode::OK, &member)
}

/// DELETE /api/projects/{id}/members/{memberId}
pub async fn remove_member(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::remove_member(
		&state.pool,
		&state.dispatcher,
		user,
		request.param("id")?,
		request.param("memberId")?,
	)
	.await?;
	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}

/// GET /api/projects/{id}/assignable-users
pub async fn assignable_users(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let users = services::assignable_users(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &users)
}
