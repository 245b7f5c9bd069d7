//! Notification inbox: unread counts, mark-read and ownership.

mod common;

use common::{Team, TestApp};
use hyper::StatusCode;
use rstest::*;
use serde_json::json;

#[fixture]
async fn app() -> TestApp {
	TestApp::new().await
}

/// Three TASK_ASSIGNED notifications for the editor.
async fn inbox(app: &TestApp, team: &Team) {
	for title in ["One", "Two", "Three"] {
		app.task(&team.owner, &team.project_id, title, &[&team.editor]).await;
	}
}

async fn unread_count(app: &TestApp, team: &Team) -> i64 {
	let (status, body) = app.get("/api/notifications/unread-count", &team.editor).await;
	assert_eq!(status, StatusCode::OK);
	body["data"]["unreadCount"].as_i64().unwrap()
}

/// Test: the reported unread count always matches the persisted rows.
#[rstest]
#[tokio::test]
async fn test_unread_count_matches_rows(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	inbox(&app, &team).await;

	assert_eq!(unread_count(&app, &team).await, 3);
	assert_eq!(app.unread_rows(&team.editor.id).await, 3);

	let (_, list) = app.get("/api/notifications?unreadOnly=true", &team.editor).await;
	let first = list["data"]["data"][0]["id"].as_str().unwrap().to_string();
	app.patch(&format!("/api/notifications/{first}/read"), &team.editor, json!({}))
		.await;

	assert_eq!(unread_count(&app, &team).await, 2);
	assert_eq!(app.unread_rows(&team.editor.id).await, 2);
}

/// Test: marking an already-read notification read again is not an error.
#[rstest]
#[tokio::test]
async fn test_mark_read_is_idempotent(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	inbox(&app, &team).await;
	let (_, list) = app.get("/api/notifications", &team.editor).await;
	let id = list["data"]["data"][0]["id"].as_str().unwrap().to_string();
	let uri = format!("/api/notifications/{id}/read");

	let (first, body) = app.patch(&uri, &team.editor, json!({})).await;
	let (second, again) = app.patch(&uri, &team.editor, json!({})).await;

	assert_eq!(first, StatusCode::OK);
	assert_eq!(second, StatusCode::OK);
	assert_eq!(body["data"]["isRead"], true);
	assert_eq!(again["data"]["isRead"], true);
	assert_eq!(unread_count(&app, &team).await, 2);
}

/// Test: read-all clears the inbox and the unread filter then returns nothing.
#[rstest]
#[tokio::test]
async fn test_mark_all_read(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	inbox(&app, &team).await;

	let (status, _) = app.patch("/api/notifications/read-all", &team.editor, json!({})).await;
	assert_eq!(status, StatusCode::OK);

	assert_eq!(unread_count(&app, &team).await, 0);
	let (_, unread) = app.get("/api/notifications?unreadOnly=true", &team.editor).await;
	assert_eq!(unread["data"]["meta"]["total"], 0);
	let (_, all) = app.get("/api/notifications", &team.editor).await;
	assert_eq!(all["data"]["meta"]["total"], 3);
}

/// Test: another user's notification looks missing and cannot be touched.
#[rstest]
#[tokio::test]
async fn test_foreign_notification_is_not_found(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	inbox(&app, &team).await;
	let (_, list) = app.get("/api/notifications", &team.editor).await;
	let id = list["data"]["data"][0]["id"].as_str().unwrap().to_string();

	let (status, body) = app
		.patch(&format!("/api/notifications/{id}/read"), &team.owner, json!({}))
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["message"], "Notification not found");

	let (status, _) = app.delete(&format!("/api/notifications/{id}"), &team.owner).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, _) = app.delete(&format!("/api/notifications/{id}"), &team.editor).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(unread_count(&app, &team).await, 2);
}

/// Test: notification pages report ceil(total / limit) and an empty page
/// past the end.
#[rstest]
#[case(1, 2, 2, 2)]
#[case(2, 2, 1, 2)]
#[case(3, 2, 0, 2)]
#[case(1, 100, 3, 1)]
#[case(4611686018427387903, 20, 0, 1)]
#[tokio::test]
async fn test_notification_pages(
	#[future] app: TestApp,
	#[case] page: i64,
	#[case] limit: i64,
	#[case] expected_rows: usize,
	#[case] expected_pages: i64,
) {
	let app = app.await;
	let team = Team::new(&app).await;
	inbox(&app, &team).await;

	let (_, body) = app
		.get(&format!("/api/notifications?page={page}&limit={limit}"), &team.editor)
		.await;

	assert_eq!(body["data"]["data"].as_array().unwrap().len(), expected_rows);
	assert_eq!(body["data"]["meta"]["total"], 3);
	assert_eq!(body["data"]["meta"]["totalPages"], expected_pages);
}
