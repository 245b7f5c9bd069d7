use hyper::StatusCode;
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::filters::TaskFilter;
use super::serializers::{AssignRequest, CreateTaskRequest, UpdateTaskRequest};
use super::services;
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// POST /api/tasks
pub async fn create(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: CreateTaskRequest = request.json()?;
	payload.validate()?;

	let task = services::create(&state.pool, &state.dispatcher, user, payload).await?;
	Response::json(StatusCode::CREATED, &task)
}

/// GET /api/tasks/my-tasks
pub async fn my_tasks(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let filter: TaskFilter = request.query()?;
	let page = services::list_assigned(&state.pool, user, &filter).await?;
	Response::json(StatusCode::OK, &page)
}

/// GET /api/tasks/project/{projectId}
pub async fn project_tasks(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let filter: TaskFilter = request.query()?;
	let page = services::list_for_project(&state.pool, user, request.param("projectId")?, &filter).await?;
	Response::json(StatusCode::OK, &page)
}

/// GET /api/tasks/{id}
pub async fn retrieve(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let task = services::get(&state.pool, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &task)
}

/// PATCH /api/tasks/{id}
pub async fn update(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: UpdateTaskRequest = request.json()?;
	payload.validate()?;

	let task = services::update(&state.pool, &state.dispatcher, user, request.param("id")?, payload).await?;
	Response::json(StatusCode::OK, &task)
}

/// DELETE /api/tasks/{id}
pub async fn destroy(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete(&state.pool, &state.dispatcher, user, request.param("id")?).await?;
	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}

/// POST /api/tasks/{id}/assign
pub async fn assign(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: AssignRequest = request.json()?;
	let task = services::assign(
		&state.pool,
		&state.dispatcher,
		user,
		request.param("id")?,
		&payload.user_id,
	)
	.await?;
	Response::json(StatusCode::CREATED, &task)
}

/// DELETE /api/tasks/{id}/assign/{userId}
pub async fn unassign(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let task = services::unassign(
		&state.pool,
		&state.dispatcher,
		user,
		request.param("id")?,
		request.param("userId")?,
	)
	.await?;
	Response::json(StatusCode::OK, &task)
}
