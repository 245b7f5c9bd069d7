pub mod settings;
pub mod state;
pub mod urls;
pub mod views;
