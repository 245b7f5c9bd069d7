use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use taskflow_core::exception::{Error, Result};
use taskflow_core::permissions::UserRole;

/// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
	/// User id
	pub sub: String,
	pub email: String,
	pub role: UserRole,
	pub iat: i64,
	pub exp: i64,
}

impl Claims {
	/// # Examples
	///
	/// ```
	/// use chrono::Duration;
	/// use taskflow::apps::auth::Claims;
	/// use taskflow_core::permissions::UserRole;
	///
	/// let claims = Claims::new("u1", "ada@example.com", UserRole::User, Duration::hours(1));
	/// assert_eq!(claims.sub, "u1");
	/// assert!(claims.exp > claims.iat);
	/// ```
	pub fn new(user_id: &str, email: &str, role: UserRole, expires_in: Duration) -> Self {
		let now = Utc::now();
		Self {
			sub: user_id.to_string(),
			email: email.to_string(),
			role,
			iat: now.timestamp(),
			exp: (now + expires_in).timestamp(),
		}
	}
}

/// HS256 token issuer and verifier.
pub struct JwtAuth {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	expires_in: Duration,
}

impl JwtAuth {
	pub fn new(secret: &[u8], expires_in: Duration) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			validation: Validation::new(Algorithm::HS256),
			expires_in,
		}
	}

	pub fn encode(&self, claims: &Claims) -> Result<String> {
		encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
			.map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
	}

	/// Issue a token for a user with the configured lifetime.
	pub fn issue(&self, user_id: &str, email: &str, role: UserRole) -> Result<String> {
		self.encode(&Claims::new(user_id, email, role, self.expires_in))
	}

	/// Decode and validate a token, including its expiry.
	pub fn verify(&self, token: &str) -> Result<Claims> {
		decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|e| {
				tracing::debug!(error = %e, "rejected bearer token");
				Error::Unauthorized("Invalid token".to_string())
			})
	}
}
