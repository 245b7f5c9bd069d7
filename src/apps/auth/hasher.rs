use argon2::Argon2;
use argon2::password_hash::{
	PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use rand::RngCore;
use taskflow_core::exception::{Error, Result};

/// Password hasher trait
///
/// Implement this trait to swap the hashing algorithm.
///
/// # Examples
///
/// ```
/// use taskflow::apps::auth::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let hash = hasher.hash("Password123!").unwrap();
///
/// assert!(hasher.verify("Password123!", &hash).unwrap());
/// assert!(!hasher.verify("wrong", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
	/// Hashes a password into a PHC string.
	fn hash(&self, password: &str) -> Result<String>;

	/// `Ok(false)` on mismatch; errors only when `hash` is unreadable.
	fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id password hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
	pub fn new() -> Self {
		Self
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> Result<String> {
		let mut salt_bytes = [0u8; 16];
		rand::thread_rng().fill_bytes(&mut salt_bytes);

		let salt = SaltString::encode_b64(&salt_bytes)
			.map_err(|e| Error::Internal(format!("failed to encode salt: {}", e)))?;

		Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| Error::Internal(format!("failed to hash password: {}", e)))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool> {
		let parsed_hash = PasswordHash::new(hash)
			.map_err(|e| Error::Internal(format!("stored password hash is invalid: {}", e)))?;

		Ok(Argon2::default()
			.verify_password(password.as_bytes(), &parsed_hash)
			.is_ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_hashes_are_salted() {
		let hasher = Argon2Hasher::new();
		let first = hasher.hash("Password123!").unwrap();
		let second = hasher.hash("Password123!").unwrap();

		assert_ne!(first, second);
		assert!(first.starts_with("$argon2id$"));
	}

	#[rstest]
	fn test_garbage_hash_is_error() {
		assert!(Argon2Hasher::new().verify("x", "not-a-hash").is_err());
	}
}
