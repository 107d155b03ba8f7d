use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AdminUser, error::ApiError, pets::Size, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shedding_level", rename_all = "PascalCase")]
pub enum Shedding {
    Low,
    Medium,
    High,
}

impl Default for Shedding {
    fn default() -> Self {
        Shedding::Medium
    }
}

/// Dog breed reference record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dog {
    pub id: Uuid,
    pub breed: String,
    pub lifespan: String,
    pub size: Size,
    pub energy_level: i16,
    pub temperament: Vec<String>,
    pub good_with_kids: bool,
    pub shedding: Shedding,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateDog {
    pub breed: String,
    pub lifespan: String,
    pub size: Size,
    pub energy_level: i16,
    #[serde(default)]
    pub temperament: Vec<String>,
    #[serde(default)]
    pub good_with_kids: bool,
    #[serde(default)]
    pub shedding: Shedding,
    pub image_url: Option<String>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateDog {
    pub breed: Option<String>,
    pub lifespan: Option<String>,
    pub size: Option<Size>,
    pub energy_level: Option<i16>,
    pub temperament: Option<Vec<String>>,
    pub good_with_kids: Option<bool>,
    pub shedding: Option<Shedding>,
    pub image_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dogs", get(list_dogs).post(create_dog))
        .route("/dogs/:id", get(get_dog).put(update_dog).delete(delete_dog))
}

#[instrument(skip(state))]
pub async fn list_dogs(State(state): State<AppState>) -> Result<Json<Vec<Dog>>, ApiError> {
    let dogs = sqlx::query_as::<_, Dog>("SELECT * FROM dogs ORDER BY breed")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(dogs))
}

#[instrument(skip(state))]
pub async fn get_dog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Dog>, ApiError> {
    let dog = sqlx::query_as::<_, Dog>("SELECT * FROM dogs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Dog"))?;
    Ok(Json(dog))
}

#[instrument(skip(state, payload))]
pub async fn create_dog(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Json(payload): Json<CreateDog>,
) -> Result<(StatusCode, Json<Dog>), ApiError> {
    let dog = sqlx::query_as::<_, Dog>(
        r#"
        INSERT INTO dogs (breed, lifespan, size, energy_level, temperament, good_with_kids, shedding, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(payload.breed.trim())
    .bind(&payload.lifespan)
    .bind(payload.size)
    .bind(payload.energy_level)
    .bind(&payload.temperament)
    .bind(payload.good_with_kids)
    .bind(payload.shedding)
    .bind(&payload.image_url)
    .fetch_one(&state.db)
    .await?;

    info!(dog_id = %dog.id, breed = %dog.breed, admin = %claims.sub, "dog created");
    Ok((StatusCode::CREATED, Json(dog)))
}

#[instrument(skip(state, payload))]
pub async fn update_dog(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDog>,
) -> Result<Json<Dog>, ApiError> {
    let dog = sqlx::query_as::<_, Dog>(
        r#"
        UPDATE dogs
        SET breed = COALESCE($2, breed),
            lifespan = COALESCE($3, lifespan),
            size = COALESCE($4, size),
            energy_level = COALESCE($5, energy_level),
            temperament = COALESCE($6, temperament),
            good_with_kids = COALESCE($7, good_with_kids),
            shedding = COALESCE($8, shedding),
            image_url = COALESCE($9, image_url),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.breed.as_deref().map(str::trim))
    .bind(&payload.lifespan)
    .bind(payload.size)
    .bind(payload.energy_level)
    .bind(&payload.temperament)
    .bind(payload.good_with_kids)
    .bind(payload.shedding)
    .bind(&payload.image_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("Dog"))?;

    info!(dog_id = %dog.id, admin = %claims.sub, "dog updated");
    Ok(Json(dog))
}

#[instrument(skip(state))]
pub async fn delete_dog(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = sqlx::query("DELETE FROM dogs WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Dog"));
    }
    info!(dog_id = %id, admin = %claims.sub, "dog deleted");
    Ok(Json(json!({ "message": "Dog deleted successfully" })))
}
