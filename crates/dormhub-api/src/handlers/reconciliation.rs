//! Manual reconciliation trigger.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use dormhub_core::error::AppError;
use dormhub_worker::{Enqueued, SweepReason};

use crate::dto::response::{ApiResponse, SweepRequestResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/reconciliation/sweep
pub async fn request_sweep(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<SweepRequestResponse>>), ApiError> {
    let queued = match state.sweeps.request(SweepReason::Manual) {
        Enqueued::Queued => true,
        Enqueued::Coalesced => false,
        Enqueued::Closed => {
            return Err(AppError::service_unavailable("Reconciliation worker is not running").into());
        }
    };
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(SweepRequestResponse { queued })),
    ))
}
