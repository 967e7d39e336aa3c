use axum::{routing::get, Router};
use remindd_core::RemindConfig;
use remindd_store::ReminderStore;
use std::sync::Arc;

/// Central shared state — passed as Arc<AppState> to all axum handlers.
pub struct AppState {
    pub config: RemindConfig,
    pub store: ReminderStore,
}

impl AppState {
    pub fn new(config: RemindConfig, store: ReminderStore) -> Self {
        Self { config, store }
    }
}

/// Assemble the full axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::http::pages::index))
        .route("/about", get(crate::http::pages::about))
        .route(
            "/schedule",
            get(crate::http::pages::schedule).post(crate::http::schedule::schedule_form),
        )
        .route("/reminders", get(crate::http::pages::reminders))
        .route(
            "/api/reminders",
            get(crate::http::reminders::list_reminders)
                .post(crate::http::reminders::create_reminder),
        )
        .route("/health", get(crate::http::health::health_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
