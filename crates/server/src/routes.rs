//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use crate::trace::trace_id_middleware;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/me", get(handlers::me));

    let analytics_routes = Router::new()
        .route("/report", get(handlers::report))
        .route("/feedbacks", get(handlers::list_feedbacks))
        .route("/download", get(handlers::download));

    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.server.max_upload_bytes;

    // Middleware layers are applied in reverse order (outermost last).
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Submission is accepted with and without the trailing slash
        .route("/api/feedback", post(handlers::submit_feedback))
        .route("/api/feedback/", post(handlers::submit_feedback))
        .route("/api/feedback/{feedback_id}", get(handlers::get_feedback))
        .nest("/api/admin", admin_routes)
        .nest("/api/analytics", analytics_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured browser origins. Unparseable origins are
/// skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
