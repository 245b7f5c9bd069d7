//! Environment-driven settings.
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file by the `manage` binary. Every variable except `JWT_SECRET` has
//! a default.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};

/// Shortest accepted signing secret.
pub const MIN_SECRET_LENGTH: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("Missing required environment variable: {0}")]
	Missing(String),
	#[error("Invalid value for {key}: {reason}")]
	Invalid { key: String, reason: String },
}

/// Deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
	Development,
	Production,
	Test,
}

impl FromStr for Environment {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.to_ascii_lowercase().as_str() {
			"development" | "dev" => Ok(Self::Development),
			"production" | "prod" => Ok(Self::Production),
			"test" => Ok(Self::Test),
			other => Err(format!("unknown environment '{}'", other)),
		}
	}
}

/// Typed reader over a key/value source.
///
/// Reads the process environment by default; tests feed it a map.
pub struct Env {
	source: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl Env {
	pub fn from_process() -> Self {
		Self {
			source: Box::new(|key| std::env::var(key).ok()),
		}
	}

	pub fn from_map(values: HashMap<String, String>) -> Self {
		Self {
			source: Box::new(move |key| values.get(key).cloned()),
		}
	}

	fn raw(&self, key: &str) -> Option<String> {
		(self.source)(key).filter(|value| !value.trim().is_empty())
	}

	pub fn str(&self, key: &str) -> Result<String, ConfigError> {
		self.raw(key)
			.ok_or_else(|| ConfigError::Missing(key.to_string()))
	}

	pub fn str_with_default(&self, key: &str, default: &str) -> String {
		self.raw(key).unwrap_or_else(|| default.to_string())
	}

	/// Parse `key` with [`FromStr`], falling back to `default` when unset.
	pub fn parse_with_default<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		match self.raw(key) {
			Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
				key: key.to_string(),
				reason: e.to_string(),
			}),
			None => Ok(default),
		}
	}
}

/// Parse a duration such as `30s`, `15m`, `12h` or `7d`. A bare number is
/// read as seconds.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use taskflow::config::settings::parse_duration;
///
/// assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
/// assert_eq!(parse_duration("90").unwrap(), Duration::seconds(90));
/// assert!(parse_duration("soon").is_err());
/// ```
pub fn parse_duration(value: &str) -> Result<Duration, String> {
	let value = value.trim();
	let split = value
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(value.len());
	let (digits, unit) = value.split_at(split);
	let amount: i64 = digits
		.parse()
		.map_err(|_| format!("'{}' is not a duration", value))?;
	if amount <= 0 {
		return Err("duration must be positive".to_string());
	}
	match unit {
		"" | "s" => Ok(Duration::seconds(amount)),
		"m" => Ok(Duration::minutes(amount)),
		"h" => Ok(Duration::hours(amount)),
		"d" => Ok(Duration::days(amount)),
		other => Err(format!("unknown duration unit '{}'", other)),
	}
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
	pub database_url: String,
	pub database_max_connections: u32,
	pub jwt_secret: SecretString,
	pub jwt_expiration: Duration,
	pub host: IpAddr,
	pub port: u16,
	pub ws_port: u16,
	pub cors_origin: String,
	pub environment: Environment,
}

impl Settings {
	/// Load settings from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::load(&Env::from_process())
	}

	pub fn load(env: &Env) -> Result<Self, ConfigError> {
		let jwt_secret = env.str("JWT_SECRET")?;
		if jwt_secret.len() < MIN_SECRET_LENGTH {
			return Err(ConfigError::Invalid {
				key: "JWT_SECRET".to_string(),
				reason: format!("must be at least {} characters", MIN_SECRET_LENGTH),
			});
		}

		let jwt_expiration = parse_duration(&env.str_with_default("JWT_EXPIRATION", "7d"))
			.map_err(|reason| ConfigError::Invalid {
				key: "JWT_EXPIRATION".to_string(),
				reason,
			})?;

		let database_max_connections = env.parse_with_default("DATABASE_MAX_CONNECTIONS", 5u32)?;
		if database_max_connections == 0 {
			return Err(ConfigError::Invalid {
				key: "DATABASE_MAX_CONNECTIONS".to_string(),
				reason: "must be at least 1".to_string(),
			});
		}

		Ok(Self {
			database_url: env.str_with_default("DATABASE_URL", "sqlite://taskflow.db?mode=rwc"),
			database_max_connections,
			jwt_secret: SecretString::from(jwt_secret),
			jwt_expiration,
			host: env.parse_with_default("HOST", IpAddr::from([0, 0, 0, 0]))?,
			port: env.parse_with_default("PORT", 3000u16)?,
			ws_port: env.parse_with_default("WS_PORT", 3001u16)?,
			cors_origin: env.str_with_default("CORS_ORIGIN", "*"),
			environment: env.parse_with_default("APP_ENV", Environment::Development)?,
		})
	}

	pub fn http_addr(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.port)
	}

	pub fn ws_addr(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.ws_port)
	}

	pub fn jwt_secret_bytes(&self) -> &[u8] {
		self.jwt_secret.expose_secret().as_bytes()
	}
}
