//! Permission Decision Table Tests
//!
//! Systematic decision tables for project role resolution and action gating.
//!
//! # Test Categories
//!
//! - Role resolution: global role x ownership x membership row
//! - Action matrix: every role against every action
//! - Task updates: role x assignment x touched fields
//! - Comment edits: role x authorship

use rstest::*;
use taskflow_core::exception::Error;
use taskflow_core::permissions::{
	Action, Caller, CommentEdit, MemberRole, MembershipSnapshot, Role, TaskChange, UserRole,
	authorize, authorize_comment_edit, authorize_task_update, role_of,
};

const OWNER_ID: &str = "owner-1";
const CALLER_ID: &str = "caller-1";

// =============================================================================
// Fixtures
// =============================================================================

fn snapshot_with(row: Option<MemberRole>) -> MembershipSnapshot {
	let mut snapshot = MembershipSnapshot::new();
	snapshot.insert("someone-else", MemberRole::Editor);
	if let Some(role) = row {
		snapshot.insert(CALLER_ID, role);
	}
	snapshot
}

fn forbidden_message(err: Error) -> String {
	match err {
		Error::Forbidden(message) => message,
		other => panic!("expected Forbidden, got {other:?}"),
	}
}

// =============================================================================
// Role Resolution Decision Table
// =============================================================================

#[rstest]
#[case(UserRole::Admin, false, None, Some(Role::Admin), "Admin without any relationship")]
#[case(UserRole::Admin, false, Some(MemberRole::Viewer), Some(Role::Admin), "Admin with viewer row")]
#[case(UserRole::Admin, true, None, Some(Role::Admin), "Admin owning the project")]
#[case(UserRole::User, true, None, Some(Role::Owner), "Owner without membership row")]
#[case(UserRole::User, true, Some(MemberRole::Viewer), Some(Role::Owner), "Owner id beats disagreeing row")]
#[case(UserRole::User, false, Some(MemberRole::Owner), Some(Role::Owner), "Explicit OWNER row")]
#[case(UserRole::User, false, Some(MemberRole::Editor), Some(Role::Editor), "Editor row")]
#[case(UserRole::User, false, Some(MemberRole::Viewer), Some(Role::Viewer), "Viewer row")]
#[case(UserRole::User, false, None, None, "No relationship")]
fn test_role_of_decision_table(
	#[case] global: UserRole,
	#[case] is_owner: bool,
	#[case] row: Option<MemberRole>,
	#[case] expected: Option<Role>,
	#[case] desc: &str,
) {
	let caller = Caller::new(CALLER_ID, global);
	let owner_id = if is_owner { CALLER_ID } else { OWNER_ID };

	let result = role_of(&caller, owner_id, &snapshot_with(row));

	assert_eq!(result, expected, "role_of failed for: {}", desc);
}

// =============================================================================
// Action Matrix
// =============================================================================

#[rstest]
#[case(Action::Read, [true, true, true, true])]
#[case(Action::CreateTask, [true, true, false, false])]
#[case(Action::DeleteTask, [true, true, false, false])]
#[case(Action::UpdateTask, [true, true, false, false])]
#[case(Action::AssignTask, [true, true, false, false])]
#[case(Action::LabelTask, [true, true, false, false])]
#[case(Action::Comment, [true, true, true, true])]
#[case(Action::ContributeToTask, [true, true, true, false])]
#[case(Action::ManageMembers, [true, true, false, false])]
#[case(Action::UpdateProject, [true, true, false, false])]
fn test_action_matrix(#[case] action: Action, #[case] allowed: [bool; 4]) {
	let roles = [Role::Admin, Role::Owner, Role::Editor, Role::Viewer];

	for (role, expected) in roles.into_iter().zip(allowed) {
		assert_eq!(
			authorize(Some(role), action).is_ok(),
			expected,
			"{:?} by {}",
			action,
			role
		);
	}
}

#[rstest]
#[case(Action::Read)]
#[case(Action::Comment)]
#[case(Action::CreateTask)]
fn test_no_role_is_always_denied(#[case] action: Action) {
	let err = authorize(None, action).unwrap_err();
	assert_eq!(forbidden_message(err), "Not authorized for this project");
}

// =============================================================================
// Task Update Decision Table
// =============================================================================

#[rstest]
#[case(Role::Admin, false, true, true, None)]
#[case(Role::Owner, false, true, true, None)]
#[case(Role::Owner, false, false, true, None)]
#[case(Role::Editor, true, true, false, None)]
#[case(Role::Editor, true, false, false, None)]
#[case(Role::Editor, true, true, true, Some("Editors can only change task status"))]
#[case(Role::Editor, true, false, true, Some("Editors can only change task status"))]
#[case(Role::Editor, false, true, false, Some("You can only update tasks assigned to you"))]
#[case(Role::Viewer, true, true, false, Some("Viewers cannot update tasks"))]
#[case(Role::Viewer, false, false, true, Some("Viewers cannot update tasks"))]
fn test_task_update_decision_table(
	#[case] role: Role,
	#[case] is_assigned: bool,
	#[case] status: bool,
	#[case] other_fields: bool,
	#[case] denial: Option<&str>,
) {
	let change = TaskChange {
		status,
		other_fields,
	};

	let result = authorize_task_update(Some(role), is_assigned, change);

	match denial {
		None => assert_eq!(result.unwrap(), role),
		Some(message) => assert_eq!(forbidden_message(result.unwrap_err()), message),
	}
}

#[rstest]
fn test_task_update_without_membership() {
	let err = authorize_task_update(None, true, TaskChange::default()).unwrap_err();
	assert_eq!(forbidden_message(err), "Not authorized for this project");
}

// =============================================================================
// Comment Authorship Decision Table
// =============================================================================

#[rstest]
#[case(Some(Role::Viewer), true, CommentEdit::Update, None)]
#[case(Some(Role::Editor), true, CommentEdit::Delete, None)]
#[case(Some(Role::Owner), false, CommentEdit::Update, Some("Only author can edit"))]
#[case(Some(Role::Owner), false, CommentEdit::Delete, Some("Only author can delete"))]
#[case(Some(Role::Admin), false, CommentEdit::Update, Some("Only author can edit"))]
#[case(Some(Role::Admin), false, CommentEdit::Delete, Some("Only author can delete"))]
#[case(None, true, CommentEdit::Update, Some("Not authorized for this project"))]
fn test_comment_edit_decision_table(
	#[case] role: Option<Role>,
	#[case] is_author: bool,
	#[case] edit: CommentEdit,
	#[case] denial: Option<&str>,
) {
	let result = authorize_comment_edit(role, is_author, edit);

	match denial {
		None => assert!(result.is_ok()),
		Some(message) => assert_eq!(forbidden_message(result.unwrap_err()), message),
	}
}
