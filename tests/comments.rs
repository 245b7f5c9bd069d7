//! Comment authorship and comment/mention fan-out.

mod common;

use common::{Team, TestApp};
use hyper::StatusCode;
use rstest::*;
use serde_json::json;

#[fixture]
async fn app() -> TestApp {
	TestApp::new().await
}

async fn comment(app: &TestApp, team: &Team, task_id: &str, content: &str) -> String {
	let (status, body) = app
		.post(&format!("/api/tasks/{task_id}/comments"), &team.editor, json!({ "content": content }))
		.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	body["data"]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Authorship
// ============================================================================

/// Test: only the author may edit or delete a comment, admins included.
#[rstest]
#[tokio::test]
async fn test_only_author_edits(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	let task_id = app.task(&team.owner, &team.project_id, "Homepage", &[&team.editor]).await;
	let comment_id = comment(&app, &team, &task_id, "First draft is up").await;
	let uri = format!("/api/comments/{comment_id}");

	for intruder in [&team.owner, &team.admin, &team.viewer] {
		let (status, body) = app.patch(&uri, intruder, json!({ "content": "edited" })).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert_eq!(body["message"], "Only author can edit");

		let (status, body) = app.delete(&uri, intruder).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert_eq!(body["message"], "Only author can delete");
	}

	let (status, body) = app.patch(&uri, &team.editor, json!({ "content": "Second draft" })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["content"], "Second draft");
	assert_eq!(body["data"]["userId"], team.editor.id.as_str());
	assert_eq!(body["data"]["user"]["firstName"], "Bob");

	let (status, _) = app.delete(&uri, &team.editor).await;
	assert_eq!(status, StatusCode::OK);
	let (_, list) = app.get(&format!("/api/tasks/{task_id}/comments"), &team.owner).await;
	assert!(list["data"].as_array().unwrap().is_empty());
}

/// Test: an outsider cannot comment.
#[rstest]
#[tokio::test]
async fn test_outsider_cannot_comment(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	let task_id = app.task(&team.owner, &team.project_id, "Homepage", &[]).await;

	let (status, body) = app
		.post(&format!("/api/tasks/{task_id}/comments"), &team.outsider, json!({ "content": "hi" }))
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Not authorized for this project");
}

// ============================================================================
// Fan-out
// ============================================================================

/// Test: a comment notifies the owner and assignees except the author.
#[rstest]
#[tokio::test]
async fn test_comment_notifies_audience(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	let task_id = app.task(&team.owner, &team.project_id, "Homepage", &[&team.editor]).await;

	comment(&app, &team, &task_id, "Ready for review").await;

	assert_eq!(app.notification_count(&team.owner.id, "COMMENT_ADDED").await, 1);
	assert_eq!(app.notification_count(&team.editor.id, "COMMENT_ADDED").await, 0);
}

/// Test: mentioning a participant sends MENTION; already-notified users,
/// outsiders and the author are not mentioned.
#[rstest]
#[tokio::test]
async fn test_mentions_skip_duplicates_and_outsiders(#[future] app: TestApp) {
	let app = app.await;
	let team = Team::new(&app).await;
	let task_id = app.task(&team.owner, &team.project_id, "Homepage", &[&team.editor]).await;

	comment(
		&app,
		&team,
		&task_id,
		"@vera@example.com @ada@example.com @carol@example.com @bob@example.com please check",
	)
	.await;

	assert_eq!(app.notification_count(&team.viewer.id, "MENTION").await, 1);
	assert_eq!(app.notification_count(&team.owner.id, "MENTION").await, 0);
	assert_eq!(app.notification_count(&team.owner.id, "COMMENT_ADDED").await, 1);
	assert_eq!(app.notification_count(&team.outsider.id, "MENTION").await, 0);
	assert_eq!(app.notification_count(&team.editor.id, "MENTION").await, 0);
}
