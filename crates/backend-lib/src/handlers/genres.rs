// ============================
// crates/backend-lib/src/handlers/genres.rs
// ============================
//! Admin genre management under `/admin/genres`.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use exlibris_common::{Genre, GenreRequest};
use tracing::info;

use super::json_body;
use crate::error::AppError;
use crate::gate::RequireAdmin;
use crate::validation::validate_genre;
use crate::AppState;

#[tracing::instrument(skip_all)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Genre>>, AppError> {
    Ok(Json(state.genres.list_genres().await?))
}

#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    body: Result<Json<GenreRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Genre>), AppError> {
    let name = validate_genre(&json_body(body)?)?;
    let genre = state.genres.create_genre(&name).await?;
    info!(genre_id = %genre.id, admin = %admin.id, "genre created");
    Ok((StatusCode::CREATED, Json(genre)))
}

#[tracing::instrument(skip_all)]
pub async fn rename(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    body: Result<Json<GenreRequest>, JsonRejection>,
) -> Result<Json<Genre>, AppError> {
    let name = validate_genre(&json_body(body)?)?;
    let genre = state.genres.rename_genre(&id, &name).await?;
    info!(genre_id = %genre.id, admin = %admin.id, "genre renamed");
    Ok(Json(genre))
}

#[tracing::instrument(skip_all)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.genres.delete_genre(&id).await?;
    info!(genre_id = %id, admin = %admin.id, "genre deleted");
    Ok(StatusCode::NO_CONTENT)
}
