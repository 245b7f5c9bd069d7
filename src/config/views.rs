use hyper::StatusCode;
use serde_json::json;
use taskflow_core::exception::Result;
use taskflow_http::{Request, Response};

use super::state::AppState;

/// GET /api/health
pub async fn health(_request: Request, state: AppState) -> Result<Response> {
	let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
		Ok(_) => "ok",
		Err(err) => {
			tracing::warn!(error = %err, "health check could not reach the database");
			"unavailable"
		}
	};
	Response::json(
		StatusCode::OK,
		&json!({ "status": "ok", "database": database }),
	)
}
