use std::sync::Arc;

use sqlx::SqlitePool;

use crate::apps::auth::{Argon2Hasher, JwtAuth, PasswordHasher};
use crate::apps::notifications::{Dispatcher, LivePublisher};
use crate::config::settings::Settings;

/// Shared state cloned into every view.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub jwt: Arc<JwtAuth>,
	pub hasher: Arc<dyn PasswordHasher>,
	pub dispatcher: Dispatcher,
}

impl AppState {
	pub fn new(
		pool: SqlitePool,
		jwt: Arc<JwtAuth>,
		hasher: Arc<dyn PasswordHasher>,
		dispatcher: Dispatcher,
	) -> Self {
		Self {
			pool,
			jwt,
			hasher,
			dispatcher,
		}
	}

	/// State backed by SQLite stores, Argon2 and the configured JWT secret.
	pub fn from_settings(pool: SqlitePool, settings: &Settings, live: Arc<dyn LivePublisher>) -> Self {
		let jwt = Arc::new(JwtAuth::new(
			settings.jwt_secret_bytes(),
			settings.jwt_expiration,
		));
		let dispatcher = Dispatcher::sqlite(pool.clone(), live);
		Self::new(pool, jwt, Arc::new(Argon2Hasher::new()), dispatcher)
	}
}
