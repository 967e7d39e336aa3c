//! Reminder JSON API — GET/POST /api/reminders
//!
//! Machine-facing twin of the web form. Works with plain `curl`:
//!
//! Create: `{"recipient": "...", "body": "...", "scheduled_at": "2026-08-06T12:00:00Z"}`
//! List:   `[{...}, ...]` ascending by schedule time, RFC 3339 UTC.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use remindd_store::{Reminder, StoreError};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct CreateReminder {
    pub recipient: String,
    pub body: String,
    /// RFC 3339; any offset is normalized to UTC.
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
}

/// POST /api/reminders — create a reminder.
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReminder>,
) -> Result<(StatusCode, Json<Reminder>), (StatusCode, Json<ApiError>)> {
    match state.store.create(&req.recipient, &req.body, req.scheduled_at) {
        Ok(reminder) => Ok((StatusCode::CREATED, Json(reminder))),
        Err(e @ StoreError::InvalidInput(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: e.to_string(),
            }),
        )),
        Err(e) => {
            warn!(error = %e, "POST /api/reminders failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// GET /api/reminders — all reminders ascending by schedule time.
pub async fn list_reminders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Reminder>>, (StatusCode, Json<ApiError>)> {
    match state.store.list_ordered() {
        Ok(reminders) => Ok(Json(reminders)),
        Err(e) => {
            warn!(error = %e, "GET /api/reminders failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError {
                    error: "failed to fetch reminders".to_string(),
                }),
            ))
        }
    }
}
