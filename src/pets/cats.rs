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
#[sqlx(type_name = "coat_length", rename_all = "PascalCase")]
pub enum CoatLength {
    Short,
    Medium,
    Long,
}

/// Cat breed reference record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cat {
    pub id: Uuid,
    pub breed: String,
    pub lifespan: String,
    pub size: Size,
    pub coat_length: CoatLength,
    pub temperament: Vec<String>,
    pub intelligence: i16,
    pub vocalization: i16,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateCat {
    pub breed: String,
    pub lifespan: String,
    pub size: Size,
    pub coat_length: CoatLength,
    #[serde(default)]
    pub temperament: Vec<String>,
    pub intelligence: i16,
    pub vocalization: i16,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCat {
    pub breed: Option<String>,
    pub lifespan: Option<String>,
    pub size: Option<Size>,
    pub coat_length: Option<CoatLength>,
    pub temperament: Option<Vec<String>>,
    pub intelligence: Option<i16>,
    pub vocalization: Option<i16>,
    pub image_url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cats", get(list_cats).post(create_cat))
        .route("/cats/:id", get(get_cat).put(update_cat).delete(delete_cat))
}

#[instrument(skip(state))]
pub async fn list_cats(State(state): State<AppState>) -> Result<Json<Vec<Cat>>, ApiError> {
    let cats = sqlx::query_as::<_, Cat>("SELECT * FROM cats ORDER BY breed")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(cats))
}

#[instrument(skip(state))]
pub async fn get_cat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Cat>, ApiError> {
    let cat = sqlx::query_as::<_, Cat>("SELECT * FROM cats WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Cat"))?;
    Ok(Json(cat))
}

#[instrument(skip(state, payload))]
pub async fn create_cat(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Json(payload): Json<CreateCat>,
) -> Result<(StatusCode, Json<Cat>), ApiError> {
    let cat = sqlx::query_as::<_, Cat>(
        r#"
        INSERT INTO cats (breed, lifespan, size, coat_length, temperament, intelligence, vocalization, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(payload.breed.trim())
    .bind(&payload.lifespan)
    .bind(payload.size)
    .bind(payload.coat_length)
    .bind(&payload.temperament)
    .bind(payload.intelligence)
    .bind(payload.vocalization)
    .bind(&payload.image_url)
    .fetch_one(&state.db)
    .await?;

    info!(cat_id = %cat.id, breed = %cat.breed, admin = %claims.sub, "cat created");
    Ok((StatusCode::CREATED, Json(cat)))
}

#[instrument(skip(state, payload))]
pub async fn update_cat(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCat>,
) -> Result<Json<Cat>, ApiError> {
    let cat = sqlx::query_as::<_, Cat>(
        r#"
        UPDATE cats
        SET breed = COALESCE($2, breed),
            lifespan = COALESCE($3, lifespan),
            size = COALESCE($4, size),
            coat_length = COALESCE($5, coat_length),
            temperament = COALESCE($6, temperament),
            intelligence = COALESCE($7, intelligence),
            vocalization = COALESCE($8, vocalization),
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
    .bind(payload.coat_length)
    .bind(&payload.temperament)
    .bind(payload.intelligence)
    .bind(payload.vocalization)
    .bind(&payload.image_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("Cat"))?;

    info!(cat_id = %cat.id, admin = %claims.sub, "cat updated");
    Ok(Json(cat))
}

#[instrument(skip(state))]
pub async fn delete_cat(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = sqlx::query("DELETE FROM cats WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Cat"));
    }
    info!(cat_id = %id, admin = %claims.sub, "cat deleted");
    Ok(Json(json!({ "message": "Cat deleted successfully" })))
}
