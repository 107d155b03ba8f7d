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
#[sqlx(type_name = "water_type", rename_all = "PascalCase")]
pub enum WaterType {
    Freshwater,
    Saltwater,
    Brackish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fish_temperament")]
pub enum FishTemperament {
    #[serde(rename = "Peaceful")]
    #[sqlx(rename = "Peaceful")]
    Peaceful,
    #[serde(rename = "Semi-aggressive")]
    #[sqlx(rename = "Semi-aggressive")]
    SemiAggressive,
    #[serde(rename = "Aggressive")]
    #[sqlx(rename = "Aggressive")]
    Aggressive,
}

impl Default for FishTemperament {
    fn default() -> Self {
        FishTemperament::Peaceful
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "care_level", rename_all = "PascalCase")]
pub enum CareLevel {
    Easy,
    Moderate,
    Difficult,
}

impl Default for CareLevel {
    fn default() -> Self {
        CareLevel::Easy
    }
}

/// Fish species reference record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fish {
    pub id: Uuid,
    pub species: String,
    pub lifespan: String,
    pub size: Size,
    pub water_type: WaterType,
    pub temperament: FishTemperament,
    pub care_level: CareLevel,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateFish {
    pub species: String,
    pub lifespan: String,
    pub size: Size,
    pub water_type: WaterType,
    #[serde(default)]
    pub temperament: FishTemperament,
    #[serde(default)]
    pub care_level: CareLevel,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFish {
    pub species: Option<String>,
    pub lifespan: Option<String>,
    pub size: Option<Size>,
    pub water_type: Option<WaterType>,
    pub temperament: Option<FishTemperament>,
    pub care_level: Option<CareLevel>,
    pub image_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fish", get(list_fish).post(create_fish))
        .route(
            "/fish/:id",
            get(get_fish).put(update_fish).delete(delete_fish),
        )
}

#[instrument(skip(state))]
pub async fn list_fish(State(state): State<AppState>) -> Result<Json<Vec<Fish>>, ApiError> {
    let fish = sqlx::query_as::<_, Fish>("SELECT * FROM fish ORDER BY species")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(fish))
}

#[instrument(skip(state))]
pub async fn get_fish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Fish>, ApiError> {
    let fish = sqlx::query_as::<_, Fish>("SELECT * FROM fish WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Fish"))?;
    Ok(Json(fish))
}

#[instrument(skip(state, payload))]
pub async fn create_fish(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Json(payload): Json<CreateFish>,
) -> Result<(StatusCode, Json<Fish>), ApiError> {
    let fish = sqlx::query_as::<_, Fish>(
        r#"
        INSERT INTO fish (species, lifespan, size, water_type, temperament, care_level, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(payload.species.trim())
    .bind(&payload.lifespan)
    .bind(payload.size)
    .bind(payload.water_type)
    .bind(payload.temperament)
    .bind(payload.care_level)
    .bind(&payload.image_url)
    .fetch_one(&state.db)
    .await?;

    info!(fish_id = %fish.id, species = %fish.species, admin = %claims.sub, "fish created");
    Ok((StatusCode::CREATED, Json(fish)))
}

#[instrument(skip(state, payload))]
pub async fn update_fish(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFish>,
) -> Result<Json<Fish>, ApiError> {
    let fish = sqlx::query_as::<_, Fish>(
        r#"
        UPDATE fish
        SET species = COALESCE($2, species),
            lifespan = COALESCE($3, lifespan),
            size = COALESCE($4, size),
            water_type = COALESCE($5, water_type),
            temperament = COALESCE($6, temperament),
            care_level = COALESCE($7, care_level),
            image_url = COALESCE($8, image_url),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.species.as_deref().map(str::trim))
    .bind(&payload.lifespan)
    .bind(payload.size)
    .bind(payload.water_type)
    .bind(payload.temperament)
    .bind(payload.care_level)
    .bind(&payload.image_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("Fish"))?;

    info!(fish_id = %fish.id, admin = %claims.sub, "fish updated");
    Ok(Json(fish))
}

#[instrument(skip(state))]
pub async fn delete_fish(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = sqlx::query("DELETE FROM fish WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Fish"));
    }
    info!(fish_id = %id, admin = %claims.sub, "fish deleted");
    Ok(Json(json!({ "message": "Fish deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperament_uses_display_spelling() {
        let t: FishTemperament = serde_json::from_str("\"Semi-aggressive\"").unwrap();
        assert_eq!(t, FishTemperament::SemiAggressive);
        assert_eq!(
            serde_json::to_string(&FishTemperament::SemiAggressive).unwrap(),
            "\"Semi-aggressive\""
        );
    }

    #[test]
    fn create_payload_defaults_temperament_and_care() {
        let payload: CreateFish = serde_json::from_str(
            r#"{"species":"Neon Tetra","lifespan":"5-8 years","size":"Small","water_type":"Freshwater"}"#,
        )
        .unwrap();
        assert_eq!(payload.temperament, FishTemperament::Peaceful);
        assert_eq!(payload.care_level, CareLevel::Easy);
    }
}
