use hyper::StatusCode;
use taskflow_core::exception::{Error, Result};
use taskflow_core::permissions::UserRole;
use taskflow_http::{Request, Response};
use validator::Validate;

use super::middleware::current_user;
use super::models::{NewUser, User};
use super::serializers::{AuthResponse, AuthUser, LoginRequest, MessageResponse, RegisterRequest};
use crate::config::state::AppState;

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse> {
	Ok(AuthResponse {
		access_token: state.jwt.issue(&user.id, &user.email, user.role)?,
		user: AuthUser::from(user),
	})
}

/// POST /api/auth/register
pub async fn register(request: Request, state: AppState) -> Result<Response> {
	let payload: RegisterRequest = request.json()?;
	payload.validate()?;

	if User::find_by_email(&state.pool, &payload.email).await?.is_some() {
		return Err(Error::BadRequest("Email already registered".to_string()));
	}

	let password_hash = state.hasher.hash(&payload.password)?;
	let user = User::create(
		&state.pool,
		NewUser {
			email: &payload.email,
			password_hash: &password_hash,
			first_name: &payload.first_name,
			last_name: &payload.last_name,
			role: UserRole::User,
		},
	)
	.await?;
	tracing::info!(user_id = %user.id, "user registered");

	Response::json(StatusCode::CREATED, &auth_response(&state, &user)?)
}

/// POST /api/auth/login
pub async fn login(request: Request, state: AppState) -> Result<Response> {
	let payload: LoginRequest = request.json()?;
	payload.validate()?;

	let invalid = || Error::Unauthorized("Invalid credentials".to_string());
	let user = User::find_by_email(&state.pool, &payload.email)
		.await?
		.ok_or_else(invalid)?;
	if !state.hasher.verify(&payload.password, &user.password_hash)? {
		return Err(invalid());
	}
	if !user.is_active {
		return Err(Error::Unauthorized("User account is disabled".to_string()));
	}

	Response::json(StatusCode::OK, &auth_response(&state, &user)?)
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(request: Request, _state: AppState) -> Result<Response> {
	current_user(&request)?;
	Response::json(
		StatusCode::OK,
		&MessageResponse {
			message: "Logged out successfully",
		},
	)
}

/// GET /api/auth/me
pub async fn me(request: Request, _state: AppState) -> Result<Response> {
	let user = current_user(&request)?;
	Response::json(StatusCode::OK, &user.profile())
}
