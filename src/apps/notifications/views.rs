use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_core::pagination::PageQuery;
use taskflow_http::{Request, Response};

use super::services;
use super::store::count_unread;
use crate::apps::auth::current_user;
use crate::config::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
	unread_only: Option<bool>,
	page: Option<i64>,
	limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnreadCount {
	unread_count: i64,
}

/// GET /api/notifications
pub async fn list(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let params: ListParams = request.query()?;
	let query = PageQuery::new(params.page, params.limit)?;

	let page = services::list(&state.pool, &user.id, params.unread_only.unwrap_or(false), query).await?;
	Response::json(StatusCode::OK, &page)
}

/// GET /api/notifications/unread-count
pub async fn unread_count(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let unread_count = count_unread(&state.pool, &user.id).await?;
	Response::json(StatusCode::OK, &UnreadCount { unread_count })
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let notification = services::mark_read(&state.pool, &user.id, request.param("id")?).await?;

	state.dispatcher.notification_read(&user.id, &notification.id).await;
	state.dispatcher.push_unread_count(&user.id).await;

	Response::json(StatusCode::OK, &notification)
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let updated = services::mark_all_read(&state.pool, &user.id).await?;

	for id in &updated {
		state.dispatcher.notification_read(&user.id, id).await;
	}
	state.dispatcher.push_unread_count(&user.id).await;

	Response::json(StatusCode::OK, &json!({ "updated": true }))
}

/// DELETE /api/notifications/{id}
pub async fn delete(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete(&state.pool, &user.id, request.param("id")?).await?;
	state.dispatcher.push_unread_count(&user.id).await;

	Response::json(StatusCode::OK, &json!({ "deleted": true }))
}
