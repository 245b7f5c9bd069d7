//! Accounts, credentials and bearer-token sessions.

pub mod hasher;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod serializers;
pub mod urls;
pub mod views;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use jwt::{Claims, JwtAuth};
pub use middleware::{AuthenticationMiddleware, current_user};
pub use models::{User, UserProfile, UserSummary};
