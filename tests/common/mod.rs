//! Shared fixtures for the API integration tests.
//!
//! Every [`TestApp`] owns a fresh SQLite file with migrations applied and
//! drives requests through the assembled middleware chain without a socket.

#![allow(dead_code)]

use std::sync::Arc;

use hyper::{Method, StatusCode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use taskflow::apps::auth::{Argon2Hasher, JwtAuth, PasswordHasher};
use taskflow::apps::notifications::Dispatcher;
use taskflow::config::state::AppState;
use taskflow::config::urls::build_handler;
use taskflow_core::Result;
use taskflow_http::{Handler, Request, dispatch};
use taskflow_websockets::ChannelRegistry;
use tempfile::NamedTempFile;

pub const PASSWORD: &str = "Password123!";
pub const JWT_SECRET: &[u8] = b"integration-test-secret";

/// Reversible stand-in for Argon2 so fixtures stay fast.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
	fn hash(&self, password: &str) -> Result<String> {
		Ok(format!("plain${password}"))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool> {
		Ok(hash == format!("plain${password}"))
	}
}

/// A registered account.
#[derive(Debug, Clone)]
pub struct Account {
	pub id: String,
	pub email: String,
	pub token: String,
}

impl Account {
	pub fn token(&self) -> Option<&str> {
		Some(&self.token)
	}
}

pub struct TestApp {
	pub pool: SqlitePool,
	pub registry: ChannelRegistry,
	pub state: AppState,
	handler: Arc<dyn Handler>,
	_db: NamedTempFile,
}

impl TestApp {
	pub async fn new() -> Self {
		Self::with_hasher(Arc::new(PlainHasher)).await
	}

	pub async fn with_argon2() -> Self {
		Self::with_hasher(Arc::new(Argon2Hasher::new())).await
	}

	async fn with_hasher(hasher: Arc<dyn PasswordHasher>) -> Self {
		let db = NamedTempFile::new().expect("temp database file");
		let url = format!("sqlite://{}", db.path().display());
		let pool = taskflow::db::connect(&url, 4).await.expect("open database");
		taskflow::db::migrate(&pool).await.expect("apply migrations");

		let registry = ChannelRegistry::new();
		let jwt = Arc::new(JwtAuth::new(JWT_SECRET, chrono::Duration::hours(1)));
		let dispatcher = Dispatcher::sqlite(pool.clone(), Arc::new(registry.clone()));
		let state = AppState::new(pool.clone(), jwt, hasher, dispatcher);
		let handler = build_handler(state.clone(), "*");

		Self {
			pool,
			registry,
			state,
			handler,
			_db: db,
		}
	}

	/// Send a request and decode the JSON body (`Null` when empty).
	pub async fn request(
		&self,
		method: Method,
		uri: &str,
		token: Option<&str>,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let mut builder = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			builder = builder.header("authorization", &format!("Bearer {token}"));
		}
		if let Some(body) = body {
			builder = builder.json(&body).expect("serialize body");
		}
		let response = dispatch(self.handler.as_ref(), builder.build().expect("build request")).await;

		let body = if response.body.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&response.body).expect("JSON response")
		};
		(response.status, body)
	}

	pub async fn get(&self, uri: &str, account: &Account) -> (StatusCode, Value) {
		self.request(Method::GET, uri, account.token(), None).await
	}

	pub async fn post(&self, uri: &str, account: &Account, body: Value) -> (StatusCode, Value) {
		self.request(Method::POST, uri, account.token(), Some(body)).await
	}

	pub async fn patch(&self, uri: &str, account: &Account, body: Value) -> (StatusCode, Value) {
		self.request(Method::PATCH, uri, account.token(), Some(body)).await
	}

	pub async fn delete(&self, uri: &str, account: &Account) -> (StatusCode, Value) {
		self.request(Method::DELETE, uri, account.token(), None).await
	}

	pub async fn register(&self, email: &str, first_name: &str, last_name: &str) -> Account {
		let (status, body) = self
			.request(
				Method::POST,
				"/api/auth/register",
				None,
				Some(json!({
					"email": email,
					"password": PASSWORD,
					"firstName": first_name,
					"lastName": last_name,
				})),
			)
			.await;
		assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");

		Account {
			id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
			email: email.to_string(),
			token: body["data"]["accessToken"].as_str().unwrap().to_string(),
		}
	}

	/// Register an account and promote it to ADMIN.
	pub async fn admin(&self, email: &str) -> Account {
		let account = self.register(email, "Site", "Admin").await;
		sqlx::query("UPDATE users SET role = 'ADMIN' WHERE id = ?")
			.bind(&account.id)
			.execute(&self.pool)
			.await
			.unwrap();
		account
	}

	/// Create a project owned by `owner` with the given editors and viewers.
	pub async fn project(
		&self,
		admin: &Account,
		name: &str,
		owner: &Account,
		editors: &[&Account],
		viewers: &[&Account],
	) -> String {
		let ids = |accounts: &[&Account]| accounts.iter().map(|a| a.id.clone()).collect::<Vec<_>>();
		let (status, body) = self
			.post(
				"/api/projects",
				admin,
				json!({
					"name": name,
					"ownerId": owner.id,
					"editors": ids(editors),
					"viewers": ids(viewers),
				}),
			)
			.await;
		assert_eq!(status, StatusCode::CREATED, "create project: {body}");
		body["data"]["id"].as_str().unwrap().to_string()
	}

	/// Create a task in `project_id` as `actor`.
	pub async fn task(&self, actor: &Account, project_id: &str, title: &str, assignees: &[&Account]) -> String {
		let assignee_ids: Vec<&str> = assignees.iter().map(|a| a.id.as_str()).collect();
		let (status, body) = self
			.post(
				"/api/tasks",
				actor,
				json!({
					"title": title,
					"projectId": project_id,
					"assigneeIds": assignee_ids,
				}),
			)
			.await;
		assert_eq!(status, StatusCode::CREATED, "create task: {body}");
		body["data"]["id"].as_str().unwrap().to_string()
	}

	/// Persisted notifications of `kind` for `user_id`.
	pub async fn notification_count(&self, user_id: &str, kind: &str) -> i64 {
		let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND type = ?")
			.bind(user_id)
			.bind(kind)
			.fetch_one(&self.pool)
			.await
			.unwrap();
		count
	}

	pub async fn unread_rows(&self, user_id: &str) -> i64 {
		let (count,): (i64,) =
			sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0")
				.bind(user_id)
				.fetch_one(&self.pool)
				.await
				.unwrap();
		count
	}

	pub async fn activity_actions(&self, task_id: &str) -> Vec<String> {
		let rows: Vec<(String,)> =
			sqlx::query_as("SELECT action FROM activities WHERE entity_id = ? ORDER BY created_at, rowid")
				.bind(task_id)
				.fetch_all(&self.pool)
				.await
				.unwrap();
		rows.into_iter().map(|(action,)| action).collect()
	}
}

/// Owner, editor, viewer and outsider around one project.
pub struct Team {
	pub admin: Account,
	pub owner: Account,
	pub editor: Account,
	pub viewer: Account,
	pub outsider: Account,
	pub project_id: String,
}

impl Team {
	pub async fn new(app: &TestApp) -> Self {
		let admin = app.admin("admin@taskflow.dev").await;
		let owner = app.register("ada@example.com", "Ada", "Lovelace").await;
		let editor = app.register("bob@example.com", "Bob", "Builder").await;
		let viewer = app.register("vera@example.com", "Vera", "Viewer").await;
		let outsider = app.register("carol@example.com", "Carol", "Outsider").await;
		let project_id = app
			.project(&admin, "Website Redesign", &owner, &[&editor], &[&viewer])
			.await;

		Self {
			admin,
			owner,
			editor,
			viewer,
			outsider,
			project_id,
		}
	}
}
