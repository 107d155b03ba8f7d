use crate::state::AppState;
use axum::Router;
use serde::{Deserialize, Serialize};

pub mod birds;
pub mod cats;
pub mod dogs;
pub mod fish;

/// Size bracket shared by every pet resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pet_size", rename_all = "PascalCase")]
pub enum Size {
    Small,
    Medium,
    Large,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(dogs::router())
        .merge(cats::router())
        .merge(birds::router())
        .merge(fish::router())
}
