//! Registration handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use dormhub_core::types::RegistrantId;
use dormhub_entity::registrant::{IdentityUpdate, Registrant, RegistrationRequest};

use crate::dto::response::{ApiResponse, RegistrationResponse, ReleaseResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/registrations
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegistrationResponse>>), ApiError> {
    let allocation = state.registration.register(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RegistrationResponse::from(allocation))),
    ))
}

/// GET /api/registrations
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Registrant>>>, ApiError> {
    let registrants = state.registration.list().await?;
    Ok(Json(ApiResponse::ok(registrants)))
}

/// GET /api/registrations/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<RegistrantId>,
) -> Result<Json<ApiResponse<Registrant>>, ApiError> {
    let registrant = state.registration.get(id).await?;
    Ok(Json(ApiResponse::ok(registrant)))
}

/// PATCH /api/registrations/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RegistrantId>,
    Json(req): Json<IdentityUpdate>,
) -> Result<Json<ApiResponse<Registrant>>, ApiError> {
    let registrant = state.registration.update_identity(id, &req).await?;
    Ok(Json(ApiResponse::ok(registrant)))
}

/// DELETE /api/registrations/{id}
pub async fn release(
    State(state): State<AppState>,
    Path(id): Path<RegistrantId>,
) -> Result<Json<ApiResponse<ReleaseResponse>>, ApiError> {
    let report = state.registration.release(id).await?;
    Ok(Json(ApiResponse::ok(ReleaseResponse {
        registrant_id: report.registrant.id,
        room_released: report.room_released,
        tag_released: report.tag_released,
    })))
}
