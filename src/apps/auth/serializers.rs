use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use taskflow_core::permissions::UserRole;
use validator::{Validate, ValidationError};

use super::models::User;

pub const PASSWORD_POLICY_MESSAGE: &str =
	"Password must contain uppercase, lowercase, number, and special character";

const SPECIAL_CHARACTERS: &str = "@$!%*?&";

static PASSWORD_CHARSET: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[A-Za-z\d@$!%*?&]{8,}$").expect("password charset pattern is valid"));

/// At least 8 characters from the allowed set, with one lowercase letter,
/// one uppercase letter, one digit and one of `@$!%*?&`.
///
/// # Examples
///
/// ```
/// use taskflow::apps::auth::serializers::validate_password_policy;
///
/// assert!(validate_password_policy("Password123!").is_ok());
/// assert!(validate_password_policy("password123!").is_err());
/// assert!(validate_password_policy("Pass 123!").is_err());
/// ```
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
	let satisfied = PASSWORD_CHARSET.is_match(password)
		&& password.chars().any(|c| c.is_ascii_lowercase())
		&& password.chars().any(|c| c.is_ascii_uppercase())
		&& password.chars().any(|c| c.is_ascii_digit())
		&& password.chars().any(|c| SPECIAL_CHARACTERS.contains(c));
	if satisfied {
		return Ok(());
	}
	let mut error = ValidationError::new("password_policy");
	error.message = Some(Cow::Borrowed(PASSWORD_POLICY_MESSAGE));
	Err(error)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
	#[validate(email(message = "email must be an email"))]
	pub email: String,
	#[validate(
		length(min = 8, message = "password must be longer than or equal to 8 characters"),
		custom(function = "validate_password_policy")
	)]
	pub password: String,
	#[validate(length(min = 1, message = "firstName must not be empty"))]
	pub first_name: String,
	#[validate(length(min = 1, message = "lastName must not be empty"))]
	pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
	#[validate(email(message = "email must be an email"))]
	pub email: String,
	#[validate(length(min = 1, message = "password should not be empty"))]
	pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
	pub id: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub role: UserRole,
	pub avatar: Option<String>,
}

impl From<&User> for AuthUser {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.clone(),
			email: user.email.clone(),
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
			role: user.role,
			avatar: user.avatar.clone(),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
	pub access_token: String,
	pub user: AuthUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
	pub message: &'static str,
}
