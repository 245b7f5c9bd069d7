//! Project administration, labels, search scoping and user profiles.

mod common;

use common::{Team, TestApp};
use hyper::StatusCode;
use rstest::*;
use serde_json::json;

// ============================================================================
// Projects
// ============================================================================

/// Test: only admins create projects.
#[rstest]
#[tokio::test]
async fn test_non_admin_cannot_create_project() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;

	let (status, body) = app
		.post("/api/projects", &team.owner, json!({ "name": "Side Project" }))
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Only admins can manage projects");
}

/// Test: name lookups ignore case.
#[rstest]
#[case("Website%20Redesign", true)]
#[case("website%20redesign", true)]
#[case("Mobile%20App", false)]
#[tokio::test]
async fn test_check_name(#[case] name: &str, #[case] expected: bool) {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;

	let (status, body) = app
		.get(&format!("/api/projects/check-name/{name}"), &team.owner)
		.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"], expected);
}

/// Test: excluding the project itself frees its own name.
#[rstest]
#[tokio::test]
async fn test_check_name_excludes_project() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;

	let (_, body) = app
		.get(
			&format!(
				"/api/projects/check-name/Website%20Redesign?excludeId={}",
				team.project_id
			),
			&team.owner,
		)
		.await;

	assert_eq!(body["data"], false);
}

/// Test: adding a member invites them once and rejects duplicates.
#[rstest]
#[tokio::test]
async fn test_add_member_invites() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;
	let uri = format!("/api/projects/{}/members", team.project_id);

	let (status, body) = app
		.post(&uri, &team.owner, json!({ "userId": team.outsider.id, "role": "EDITOR" }))
		.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	assert_eq!(body["data"]["role"], "EDITOR");
	assert_eq!(app.notification_count(&team.outsider.id, "PROJECT_INVITE").await, 1);

	let (status, body) = app
		.post(&uri, &team.owner, json!({ "userId": team.outsider.id, "role": "VIEWER" }))
		.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["message"], "User is already a member of this project");
	assert_eq!(app.notification_count(&team.outsider.id, "PROJECT_INVITE").await, 1);
}

/// Test: editors cannot manage the member list.
#[rstest]
#[tokio::test]
async fn test_editor_cannot_add_member() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;

	let (status, body) = app
		.post(
			&format!("/api/projects/{}/members", team.project_id),
			&team.editor,
			json!({ "userId": team.outsider.id, "role": "VIEWER" }),
		)
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Only project owner can manage members");
}

// ============================================================================
// Labels
// ============================================================================

/// Test: only the owner labels tasks; the label shows up on the task.
#[rstest]
#[tokio::test]
async fn test_label_attach_permissions() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;
	let task_id = app.task(&team.owner, &team.project_id, "Landing page", &[&team.editor]).await;
	let (status, body) = app
		.post("/api/labels", &team.editor, json!({ "name": "frontend", "color": "#ff0000" }))
		.await;
	assert_eq!(status, StatusCode::CREATED, "{body}");
	let label_id = body["data"]["id"].as_str().unwrap().to_string();
	let uri = format!("/api/labels/attach/{task_id}/{label_id}");

	let (status, _) = app.post(&uri, &team.editor, json!({})).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, body) = app.post(&uri, &team.owner, json!({})).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["data"]["labels"][0]["name"], "frontend");

	// attaching twice changes nothing
	app.post(&uri, &team.owner, json!({})).await;
	let labeled = app
		.activity_actions(&task_id)
		.await
		.into_iter()
		.filter(|action| action == "labeled")
		.count();
	assert_eq!(labeled, 1);
}

/// Test: label names are unique and only admins rename them.
#[rstest]
#[tokio::test]
async fn test_label_management() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;
	let (_, body) = app.post("/api/labels", &team.owner, json!({ "name": "bug" })).await;
	let label_id = body["data"]["id"].as_str().unwrap().to_string();

	let (status, body) = app.post("/api/labels", &team.editor, json!({ "name": "bug" })).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["message"], "Label name already exists");

	let uri = format!("/api/labels/{label_id}");
	let (status, body) = app.patch(&uri, &team.owner, json!({ "name": "defect" })).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Only admins can manage labels");

	let (status, body) = app.patch(&uri, &team.admin, json!({ "name": "defect" })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["name"], "defect");
}

// ============================================================================
// Search
// ============================================================================

/// Test: search only sees the caller's projects.
#[rstest]
#[tokio::test]
async fn test_search_scope() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;
	app.task(&team.owner, &team.project_id, "Fix login page", &[]).await;
	let other = app
		.project(&team.admin, "Internal Tools", &team.outsider, &[], &[])
		.await;
	app.task(&team.outsider, &other, "Fix login flow", &[]).await;

	let (status, body) = app.get("/api/search/tasks?q=login", &team.viewer).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["meta"]["total"], 1);
	assert_eq!(body["data"]["data"][0]["title"], "Fix login page");

	let (_, body) = app.get("/api/search/tasks?q=login", &team.admin).await;
	assert_eq!(body["data"]["meta"]["total"], 2);

	let (status, body) = app
		.get(&format!("/api/search/tasks?projectId={other}"), &team.viewer)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Not authorized for this project");
}

/// Test: comment search carries the task it belongs to.
#[rstest]
#[tokio::test]
async fn test_search_comments() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;
	let task_id = app.task(&team.owner, &team.project_id, "Landing page", &[]).await;
	app.post(
		&format!("/api/tasks/{task_id}/comments"),
		&team.viewer,
		json!({ "content": "The hero image is blurry" }),
	)
	.await;

	let (status, body) = app.get("/api/search/comments?q=blurry", &team.editor).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["meta"]["total"], 1);
	assert_eq!(body["data"]["data"][0]["task"]["title"], "Landing page");

	let (_, body) = app.get("/api/search/comments?q=blurry", &team.outsider).await;
	assert_eq!(body["data"]["meta"]["total"], 0);
}

// ============================================================================
// Users
// ============================================================================

/// Test: profile updates and avatar clearing.
#[rstest]
#[tokio::test]
async fn test_profile_avatar() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;

	let (status, body) = app
		.patch(
			"/api/users/profile",
			&team.editor,
			json!({ "firstName": "Robert", "avatar": "https://cdn.example.com/bob.png" }),
		)
		.await;
	assert_eq!(status, StatusCode::OK, "{body}");
	assert_eq!(body["data"]["firstName"], "Robert");
	assert_eq!(body["data"]["avatar"], "https://cdn.example.com/bob.png");

	let (status, _) = app
		.patch("/api/users/profile", &team.editor, json!({ "avatar": "not a url" }))
		.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (_, body) = app
		.patch("/api/users/profile", &team.editor, json!({ "avatar": "" }))
		.await;
	assert!(body["data"]["avatar"].is_null());
	assert_eq!(body["data"]["firstName"], "Robert");
}

/// Test: the user list is admin-only and never leaks password hashes.
#[rstest]
#[tokio::test]
async fn test_user_list_is_admin_only() {
	let app = TestApp::new().await;
	let team = Team::new(&app).await;

	let (status, body) = app.get("/api/users", &team.owner).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Admin access required");

	let (status, body) = app.get("/api/users", &team.admin).await;
	assert_eq!(status, StatusCode::OK);
	let users = body["data"].as_array().unwrap();
	assert_eq!(users.len(), 5);
	assert!(users.iter().all(|user| user.get("password").is_none()));
}
