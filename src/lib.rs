pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod oauth;
pub mod pets;
pub mod state;
