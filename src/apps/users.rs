//! Account self-service and admin user management.

pub mod serializers;
pub mod services;
pub mod urls;
pub mod views;
