use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod store;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
