use axum::response::Html;

static INDEX_HTML: &str = include_str!("../../static/index.html");
static ABOUT_HTML: &str = include_str!("../../static/about.html");
static SCHEDULE_HTML: &str = include_str!("../../static/schedule.html");
static REMINDERS_HTML: &str = include_str!("../../static/reminders.html");

/// Serve the embedded landing page at `GET /`.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Serve the about page at `GET /about`.
pub async fn about() -> Html<&'static str> {
    Html(ABOUT_HTML)
}

/// Serve the scheduling form at `GET /schedule`.
pub async fn schedule() -> Html<&'static str> {
    Html(SCHEDULE_HTML)
}

/// Serve the listing page at `GET /reminders`.
///
/// The page fetches `/api/reminders` and renders schedule times in the
/// viewer's local zone; the server never does display formatting.
pub async fn reminders() -> Html<&'static str> {
    Html(REMINDERS_HTML)
}
