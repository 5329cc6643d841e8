//! Contains all the routes that this application can handle.

mod api;
mod home;
mod sitemap;

// re-export
pub use api::{register, SignupError, SignupOutcome};

use crate::AppState;
use home::home;
use sitemap::sitemap;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Router,
};

/// Largest accepted API request body, a signup form is well below a kilobyte.
pub const API_BODY_LIMIT: usize = 16 * 1024;

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/sitemap.xml", get(sitemap))
        .with_state(app_state.clone())
        .nest("/api", api_routes(app_state))
        .route("/health-check", get(health_check))
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/signup", post(api::signup))
        .layer(DefaultBodyLimit::max(API_BODY_LIMIT))
        .with_state(app_state)
}
