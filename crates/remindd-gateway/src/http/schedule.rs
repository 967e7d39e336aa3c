//! Scheduling form endpoint — POST /schedule
//!
//! Accepts the urlencoded form from the embedded schedule page and
//! redirects back with `?success=true` or `?error=true`, so the page
//! itself stays static.

use axum::{extract::State, response::Redirect, Form};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct ScheduleForm {
    pub email: String,
    pub message: String,
    /// RFC 3339, or the bare `YYYY-MM-DDTHH:MM` a datetime-local input submits.
    pub datetime: String,
}

/// POST /schedule — create a reminder from the web form.
pub async fn schedule_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ScheduleForm>,
) -> Redirect {
    let scheduled_at = match parse_schedule_time(&form.datetime) {
        Some(t) => t,
        None => {
            warn!(datetime = %form.datetime, "unparseable schedule time");
            return Redirect::to("/schedule?error=true");
        }
    };

    match state.store.create(&form.email, &form.message, scheduled_at) {
        Ok(reminder) => {
            info!(reminder_id = %reminder.id, "reminder scheduled via form");
            Redirect::to("/schedule?success=true")
        }
        Err(e) => {
            warn!(error = %e, "form submission rejected");
            Redirect::to("/schedule?error=true")
        }
    }
}

/// Parse a user-supplied schedule time into a UTC instant.
///
/// RFC 3339 values carry their own offset and are normalized. A bare
/// datetime-local value has no zone, so it is read in the server's
/// local zone; the earliest mapping wins when DST makes the wall time
/// ambiguous, and a nonexistent wall time is rejected.
pub(crate) fn parse_schedule_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}
