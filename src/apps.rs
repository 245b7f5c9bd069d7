//! Resource apps.
//!
//! Every app follows the same layout: `models` (rows and their queries),
//! `serializers` (request and response bodies), `services` (authorization
//! and writes), `views` (HTTP handlers) and `urls` (routes mounted by
//! [`crate::config::urls`]).

pub mod activity;
pub mod attachments;
pub mod auth;
pub mod comments;
pub mod labels;
pub mod notifications;
pub mod projects;
pub mod search;
pub mod subtasks;
pub mod tasks;
pub mod users;
