use hyper::StatusCode;
use taskflow_core::exception::Result;
use taskflow_core::pagination::PageParams;
use taskflow_http::{Request, Response};

use super::services;
use crate::apps::auth::current_user;
use crate::config::state::AppState;

/// GET /api/activities/project/{projectId}
pub async fn project_activity(request: Request, state: AppState) -> Result<Response> {
	let caller = current_user(&request)?.caller();
	let query = request.query::<PageParams>()?.into_query()?;
	let page = services::list_for_project(&state.pool, &caller, request.param("projectId")?, query).await?;
	Response::json(StatusCode::OK, &page)
}

/// GET /api/activities/task/{taskId}
pub async fn task_activity(request: Request, state: AppState) -> Result<Response> {
	let caller = current_user(&request)?.caller();
	let query = request.query::<PageParams>()?.into_query()?;
	let page = services::list_for_task(&state.pool, &caller, request.param("taskId")?, query).await?;
	Response::json(StatusCode::OK, &page)
}
