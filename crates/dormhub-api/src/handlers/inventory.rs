//! Inventory import and listing handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use dormhub_entity::room::Room;
use dormhub_entity::tag::Tag;

use crate::dto::request::{ImportRoomsRequest, ImportTagsRequest};
use crate::dto::response::{ApiResponse, ImportResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/rooms/import
pub async fn import_rooms(
    State(state): State<AppState>,
    Json(req): Json<ImportRoomsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ImportResponse<Room>>>), ApiError> {
    let rooms = state.inventory.import_rooms(req.rooms).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ImportResponse {
            imported: rooms.len(),
            items: rooms,
        })),
    ))
}

/// POST /api/tags/import
pub async fn import_tags(
    State(state): State<AppState>,
    Json(req): Json<ImportTagsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ImportResponse<Tag>>>), ApiError> {
    let tags = state.inventory.import_tags(req.tags).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ImportResponse {
            imported: tags.len(),
            items: tags,
        })),
    ))
}

/// GET /api/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Room>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.inventory.list_rooms().await?)))
}

/// GET /api/tags
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Tag>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.inventory.list_tags().await?)))
}
