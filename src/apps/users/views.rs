use hyper::StatusCode;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::serializers::{ChangePasswordRequest, UpdateProfileRequest};
use super::services;
use crate::apps::auth::current_user;
use crate::apps::auth::serializers::MessageResponse;
use crate::config::state::AppState;

/// GET /api/users
pub async fn list(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let users = services::list(&state.pool, user).await?;
	Response::json(StatusCode::OK, &users)
}

/// GET /api/users/profile
pub async fn profile(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let profile = services::profile(&state.pool, &user.id).await?;
	Response::json(StatusCode::OK, &profile)
}

/// PATCH /api/users/profile
pub async fn update_profile(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: UpdateProfileRequest = request.json()?;
	payload.validate()?;

	let profile = services::update_profile(&state.pool, &user.id, payload).await?;
	Response::json(StatusCode::OK, &profile)
}

/// POST /api/users/change-password
pub async fn change_password(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	let payload: ChangePasswordRequest = request.json()?;
	payload.validate()?;

	services::change_password(&state.pool, state.hasher.as_ref(), &user.id, payload).await?;
	Response::json(
		StatusCode::OK,
		&MessageResponse {
			message: "Password changed successfully",
		},
	)
}

/// DELETE /api/users/account
pub async fn delete_account(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete_account(&state.pool, &user.id).await?;
	Response::json(
		StatusCode::OK,
		&MessageResponse {
			message: "Account deleted successfully",
		},
	)
}

/// DELETE /api/users/{id}
pub async fn destroy(request: Request, state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	services::delete_user(&state.pool, user, request.param("id")?).await?;
	Response::json(
		StatusCode::OK,
		&MessageResponse {
			message: "User deleted successfully",
		},
	)
}
