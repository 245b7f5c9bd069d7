//! Project authorization.
//!
//! Authorization is a pure computation over explicit inputs: the caller, the
//! project's owner id and a snapshot of the project's membership rows. No
//! function in this module touches storage, so every rule can be exercised
//! without a database.
//!
//! ```
//! use taskflow_core::permissions::{
//!     Action, Caller, MemberRole, MembershipSnapshot, Role, UserRole, authorize, role_of,
//! };
//!
//! let snapshot = MembershipSnapshot::from_iter([("bob".to_string(), MemberRole::Editor)]);
//! let bob = Caller::new("bob", UserRole::User);
//!
//! let role = role_of(&bob, "alice", &snapshot);
//! assert_eq!(role, Some(Role::Editor));
//! assert!(authorize(role, Action::Read).is_ok());
//! assert!(authorize(role, Action::CreateTask).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exception::{Error, Result};

/// Message returned when the caller has no relationship with the project.
pub const NOT_A_MEMBER: &str = "Not authorized for this project";

/// Global account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
	Admin,
	User,
}

/// Role recorded on a membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
	Owner,
	Editor,
	Viewer,
}

/// Effective role of a caller within one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	Admin,
	Owner,
	Editor,
	Viewer,
}

impl From<MemberRole> for Role {
	fn from(role: MemberRole) -> Self {
		match role {
			MemberRole::Owner => Role::Owner,
			MemberRole::Editor => Role::Editor,
			MemberRole::Viewer => Role::Viewer,
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Role::Admin => "ADMIN",
			Role::Owner => "OWNER",
			Role::Editor => "EDITOR",
			Role::Viewer => "VIEWER",
		};
		f.write_str(name)
	}
}

/// The authenticated user issuing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
	pub id: String,
	pub role: UserRole,
}

impl Caller {
	pub fn new(id: impl Into<String>, role: UserRole) -> Self {
		Self {
			id: id.into(),
			role,
		}
	}

	pub fn is_admin(&self) -> bool {
		self.role == UserRole::Admin
	}
}

/// Membership rows of a single project, keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSnapshot {
	members: HashMap<String, MemberRole>,
}

impl MembershipSnapshot {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, user_id: impl Into<String>, role: MemberRole) {
		self.members.insert(user_id.into(), role);
	}

	pub fn role_of(&self, user_id: &str) -> Option<MemberRole> {
		self.members.get(user_id).copied()
	}

	pub fn contains(&self, user_id: &str) -> bool {
		self.members.contains_key(user_id)
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}
}

impl FromIterator<(String, MemberRole)> for MembershipSnapshot {
	fn from_iter<I: IntoIterator<Item = (String, MemberRole)>>(iter: I) -> Self {
		Self {
			members: iter.into_iter().collect(),
		}
	}
}

/// Resolve the caller's effective role in a project.
///
/// Global admins short-circuit to [`Role::Admin`]. The project's owner id is
/// authoritative: the owner is [`Role::Owner`] whatever the membership rows
/// say. Otherwise the membership row decides, and a caller without one has no
/// role at all.
pub fn role_of(caller: &Caller, owner_id: &str, snapshot: &MembershipSnapshot) -> Option<Role> {
	if caller.is_admin() {
		return Some(Role::Admin);
	}
	if caller.id == owner_id {
		return Some(Role::Owner);
	}
	snapshot.role_of(&caller.id).map(Role::from)
}

/// Something a caller may attempt inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
	/// Read the project, its tasks, comments, members or activity.
	Read,
	CreateTask,
	DeleteTask,
	/// Change any task field beyond status.
	UpdateTask,
	AssignTask,
	/// Attach or detach labels on a task.
	LabelTask,
	/// Create comments.
	Comment,
	/// Create, edit or delete subtasks and attachments.
	ContributeToTask,
	ManageMembers,
	/// Update the project's own fields.
	UpdateProject,
}

impl Action {
	fn denial_message(self) -> &'static str {
		match self {
			Action::Read | Action::Comment => NOT_A_MEMBER,
			Action::CreateTask => "Only project owner can create tasks",
			Action::DeleteTask => "Only project owner can delete tasks",
			Action::UpdateTask => "Only project owner can update all task fields",
			Action::AssignTask => "Only project owner can assign tasks",
			Action::LabelTask => "Only project owner can change task labels",
			Action::ContributeToTask => "Viewers cannot modify tasks",
			Action::ManageMembers => "Only project owner can manage members",
			Action::UpdateProject => "Only owner can update project",
		}
	}
}

impl Role {
	/// Whether this role may perform `action`.
	pub fn permits(self, action: Action) -> bool {
		match self {
			Role::Admin | Role::Owner => true,
			Role::Editor => matches!(
				action,
				Action::Read | Action::Comment | Action::ContributeToTask
			),
			Role::Viewer => matches!(action, Action::Read | Action::Comment),
		}
	}
}

/// Gate an action on the caller's resolved role.
///
/// Returns the role back on success so callers can keep branching on it.
pub fn authorize(role: Option<Role>, action: Action) -> Result<Role> {
	let role = role.ok_or_else(|| Error::Forbidden(NOT_A_MEMBER.to_string()))?;
	if role.permits(action) {
		Ok(role)
	} else {
		Err(Error::Forbidden(action.denial_message().to_string()))
	}
}

/// Which task fields an update request touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskChange {
	pub status: bool,
	/// Anything other than status: title, description, priority, due date,
	/// position or labels.
	pub other_fields: bool,
}

/// Gate a task update.
///
/// Editors may only move the status of tasks assigned to them; a request
/// that mixes status with any other field is rejected as a whole.
pub fn authorize_task_update(role: Option<Role>, is_assigned: bool, change: TaskChange) -> Result<Role> {
	let role = role.ok_or_else(|| Error::Forbidden(NOT_A_MEMBER.to_string()))?;
	match role {
		Role::Admin | Role::Owner => Ok(role),
		Role::Editor => {
			if !is_assigned {
				return Err(Error::Forbidden(
					"You can only update tasks assigned to you".to_string(),
				));
			}
			if change.other_fields {
				return Err(Error::Forbidden(
					"Editors can only change task status".to_string(),
				));
			}
			Ok(role)
		}
		Role::Viewer => Err(Error::Forbidden("Viewers cannot update tasks".to_string())),
	}
}

/// Comment mutation kinds gated on authorship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentEdit {
	Update,
	Delete,
}

/// Gate a comment update or delete.
///
/// Membership grants visibility; only authorship grants the edit. No role,
/// admin included, overrides authorship.
pub fn authorize_comment_edit(role: Option<Role>, is_author: bool, edit: CommentEdit) -> Result<()> {
	authorize(role, Action::Read)?;
	if is_author {
		return Ok(());
	}
	let message = match edit {
		CommentEdit::Update => "Only author can edit",
		CommentEdit::Delete => "Only author can delete",
	};
	Err(Error::Forbidden(message.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_owner_id_wins_over_membership_row() {
		let snapshot = MembershipSnapshot::from_iter([("alice".to_string(), MemberRole::Viewer)]);
		let alice = Caller::new("alice", UserRole::User);

		assert_eq!(role_of(&alice, "alice", &snapshot), Some(Role::Owner));
	}

	#[rstest]
	fn test_explicit_owner_row_is_owner() {
		let snapshot = MembershipSnapshot::from_iter([("carol".to_string(), MemberRole::Owner)]);
		let carol = Caller::new("carol", UserRole::User);

		assert_eq!(role_of(&carol, "alice", &snapshot), Some(Role::Owner));
	}

	#[rstest]
	fn test_admin_without_membership() {
		let admin = Caller::new("root", UserRole::Admin);
		assert_eq!(role_of(&admin, "alice", &MembershipSnapshot::new()), Some(Role::Admin));
	}

	#[rstest]
	fn test_stranger_has_no_role() {
		let mallory = Caller::new("mallory", UserRole::User);
		let err = authorize(role_of(&mallory, "alice", &MembershipSnapshot::new()), Action::Read)
			.unwrap_err();

		assert_eq!(err, Error::Forbidden(NOT_A_MEMBER.to_string()));
	}

	#[rstest]
	fn test_role_display_matches_wire_name() {
		assert_eq!(Role::Editor.to_string(), "EDITOR");
		assert_eq!(serde_json::to_value(Role::Viewer).unwrap(), "VIEWER");
	}
}
