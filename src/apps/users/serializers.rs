use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::apps::auth::serializers::validate_password_policy;

static AVATAR_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^$|^https?://.+$").expect("avatar pattern is valid"));

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
	#[validate(length(min = 1, message = "firstName must not be empty"))]
	pub first_name: Option<String>,
	#[validate(length(min = 1, message = "lastName must not be empty"))]
	pub last_name: Option<String>,
	/// An empty string clears the avatar.
	#[validate(regex(path = *AVATAR_URL, message = "avatar must be a valid URL or empty"))]
	pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
	#[validate(length(min = 8, message = "Current password must be at least 8 characters"))]
	pub current_password: String,
	#[validate(
		length(min = 8, message = "New password must be at least 8 characters"),
		custom(function = "validate_password_policy")
	)]
	pub new_password: String,
	#[validate(length(min = 8, message = "confirmPassword must be at least 8 characters"))]
	pub confirm_password: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(None, true)]
	#[case(Some(""), true)]
	#[case(Some("https://cdn.example.com/a.png"), true)]
	#[case(Some("http://cdn.example.com/a.png"), true)]
	#[case(Some("ftp://cdn.example.com/a.png"), false)]
	#[case(Some("avatar.png"), false)]
	fn test_avatar_must_be_url_or_empty(#[case] avatar: Option<&str>, #[case] valid: bool) {
		let request = UpdateProfileRequest {
			avatar: avatar.map(str::to_string),
			..Default::default()
		};
		assert_eq!(request.validate().is_ok(), valid);
	}

	#[rstest]
	fn test_new_password_follows_policy() {
		let request = ChangePasswordRequest {
			current_password: "Password123!".into(),
			new_password: "alllowercase1!".into(),
			confirm_password: "alllowercase1!".into(),
		};
		let errors = request.validate().unwrap_err();
		assert!(errors.field_errors().contains_key("new_password"));
	}
}
