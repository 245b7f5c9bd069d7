//! # TaskFlow
//!
//! Project and task management backend with role-based project membership,
//! per-user notifications and a live notification channel.
//!
//! ## Layout
//!
//! - [`config`] - settings, shared application state and the URL table
//! - [`apps`] - one module per resource (auth, projects, tasks, ...), each
//!   split into models, services, views and urls
//! - [`db`] - SQLite pool and migrations
//!
//! The HTTP plumbing lives in `taskflow-http`, the live channel in
//! `taskflow-websockets` and the authorization rules in `taskflow-core`.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use taskflow::config::settings::Settings;
//! use taskflow::config::state::AppState;
//! use taskflow::config::urls::build_handler;
//! use taskflow_websockets::ChannelRegistry;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let pool = taskflow::db::connect_with_settings(&settings).await?;
//! taskflow::db::migrate(&pool).await?;
//!
//! let registry = ChannelRegistry::new();
//! let state = AppState::from_settings(pool, &settings, Arc::new(registry));
//! let handler = build_handler(state, &settings.cors_origin);
//! # let _ = handler;
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod config;
pub mod db;
