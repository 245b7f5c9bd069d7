use serde::Deserialize;
use taskflow_core::permissions::MemberRole;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
	#[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
	pub name: String,
	pub description: Option<String>,
	pub color: Option<String>,
	pub is_archived: Option<bool>,
	/// Defaults to the creating admin.
	pub owner_id: Option<String>,
	#[serde(default)]
	pub editors: Vec<String>,
	#[serde(default)]
	pub viewers: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
	#[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
	pub name: Option<String>,
	pub description: Option<String>,
	pub color: Option<String>,
	pub is_archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
	pub user_id: String,
	pub role: MemberRole,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
	pub role: MemberRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckNameParams {
	pub exclude_id: Option<String>,
}
