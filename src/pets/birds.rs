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
#[sqlx(type_name = "flight_ability", rename_all = "PascalCase")]
pub enum FlightAbility {
    Poor,
    Moderate,
    Excellent,
}

impl Default for FlightAbility {
    fn default() -> Self {
        FlightAbility::Excellent
    }
}

fn default_talking_ability() -> i16 {
    1
}

/// Bird species reference record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bird {
    pub id: Uuid,
    pub species: String,
    pub lifespan: String,
    pub size: Size,
    pub color: String,
    pub talking_ability: i16,
    pub flight_ability: FlightAbility,
    pub temperament: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateBird {
    pub species: String,
    pub lifespan: String,
    pub size: Size,
    pub color: String,
    #[serde(default = "default_talking_ability")]
    pub talking_ability: i16,
    #[serde(default)]
    pub flight_ability: FlightAbility,
    #[serde(default)]
    pub temperament: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBird {
    pub species: Option<String>,
    pub lifespan: Option<String>,
    pub size: Option<Size>,
    pub color: Option<String>,
    pub talking_ability: Option<i16>,
    pub flight_ability: Option<FlightAbility>,
    pub temperament: Option<Vec<String>>,
    pub image_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/birds", get(list_birds).post(create_bird))
        .route(
            "/birds/:id",
            get(get_bird).put(update_bird).delete(delete_bird),
        )
}

#[instrument(skip(state))]
pub async fn list_birds(State(state): State<AppState>) -> Result<Json<Vec<Bird>>, ApiError> {
    let birds = sqlx::query_as::<_, Bird>("SELECT * FROM birds ORDER BY species")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(birds))
}

#[instrument(skip(state))]
pub async fn get_bird(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Bird>, ApiError> {
    let bird = sqlx::query_as::<_, Bird>("SELECT * FROM birds WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Bird"))?;
    Ok(Json(bird))
}

#[instrument(skip(state, payload))]
pub async fn create_bird(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Json(payload): Json<CreateBird>,
) -> Result<(StatusCode, Json<Bird>), ApiError> {
    let bird = sqlx::query_as::<_, Bird>(
        r#"
        INSERT INTO birds (species, lifespan, size, color, talking_ability, flight_ability, temperament, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(payload.species.trim())
    .bind(&payload.lifespan)
    .bind(payload.size)
    .bind(&payload.color)
    .bind(payload.talking_ability)
    .bind(payload.flight_ability)
    .bind(&payload.temperament)
    .bind(&payload.image_url)
    .fetch_one(&state.db)
    .await?;

    info!(bird_id = %bird.id, species = %bird.species, admin = %claims.sub, "bird created");
    Ok((StatusCode::CREATED, Json(bird)))
}

#[instrument(skip(state, payload))]
pub async fn update_bird(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBird>,
) -> Result<Json<Bird>, ApiError> {
    let bird = sqlx::query_as::<_, Bird>(
        r#"
        UPDATE birds
        SET species = COALESCE($2, species),
            lifespan = COALESCE($3, lifespan),
            size = COALESCE($4, size),
            color = COALESCE($5, color),
            talking_ability = COALESCE($6, talking_ability),
            flight_ability = COALESCE($7, flight_ability),
            temperament = COALESCE($8, temperament),
            image_url = COALESCE($9, image_url),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.species.as_deref().map(str::trim))
    .bind(&payload.lifespan)
    .bind(payload.size)
    .bind(&payload.color)
    .bind(payload.talking_ability)
    .bind(payload.flight_ability)
    .bind(&payload.temperament)
    .bind(&payload.image_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("Bird"))?;

    info!(bird_id = %bird.id, admin = %claims.sub, "bird updated");
    Ok(Json(bird))
}

#[instrument(skip(state))]
pub async fn delete_bird(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = sqlx::query("DELETE FROM birds WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Bird"));
    }
    info!(bird_id = %id, admin = %claims.sub, "bird deleted");
    Ok(Json(json!({ "message": "Bird deleted successfully" })))
}
