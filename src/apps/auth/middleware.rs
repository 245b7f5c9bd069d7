//! Bearer-token authentication for the HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use hyper::Method;
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};
use taskflow_http::{Handler, Middleware, Request, Response};

use super::jwt::JwtAuth;
use super::models::User;

/// Paths reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/api/health", "/api/auth/register", "/api/auth/login"];

/// Resolves `Authorization: Bearer <jwt>` to an active [`User`] and stores it
/// in the request extensions.
pub struct AuthenticationMiddleware {
	pool: SqlitePool,
	jwt: Arc<JwtAuth>,
}

impl AuthenticationMiddleware {
	pub fn new(pool: SqlitePool, jwt: Arc<JwtAuth>) -> Self {
		Self { pool, jwt }
	}

	async fn authenticate(&self, request: &Request) -> Result<User> {
		let token = request
			.bearer_token()
			.ok_or_else(|| Error::Unauthorized("Unauthorized".to_string()))?;
		let claims = self.jwt.verify(token)?;

		let user = User::find(&self.pool, &claims.sub)
			.await?
			.ok_or_else(|| Error::Unauthorized("Unauthorized".to_string()))?;
		if !user.is_active {
			return Err(Error::Unauthorized("User account is disabled".to_string()));
		}
		Ok(user)
	}
}

#[async_trait]
impl Middleware for AuthenticationMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let user = self.authenticate(&request).await?;
		tracing::debug!(user_id = %user.id, path = %request.path(), "authenticated request");
		request.extensions.insert(user);
		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		let path = request.path().trim_end_matches('/');
		request.method != Method::OPTIONS && !PUBLIC_PATHS.contains(&path)
	}
}

/// The user attached by [`AuthenticationMiddleware`].
pub fn current_user(request: &Request) -> Result<&User> {
	request
		.extensions
		.get::<User>()
		.ok_or_else(|| Error::Unauthorized("Unauthorized".to_string()))
}
