//! Projects and their memberships.

pub mod access;
pub mod models;
pub mod serializers;
pub mod services;
pub mod urls;
pub mod views;

pub use models::{MemberWithUser, Project, ProjectDetail, ProjectMember, ProjectSummary};
