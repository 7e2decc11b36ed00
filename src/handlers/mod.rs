pub mod catalog;
pub mod decks;
pub mod goals;
pub mod progress;
pub mod review;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::state::AppState;

/// The full JSON API. Assembled here (rather than in `main`) so integration
/// tests can mount the same router against a scratch database.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/register", post(auth::handlers::register))
    .route("/api/login", post(auth::handlers::login))
    .route("/api/logout", post(auth::handlers::logout))
    .route("/api/review/due", get(review::due))
    .route("/api/review", post(review::submit))
    .route("/api/review/stats", get(review::stats))
    .route("/api/review/history", get(review::history))
    .route("/api/courses", get(catalog::list_courses))
    .route("/api/courses/{id}", get(catalog::course_detail))
    .route("/api/courses/{id}/practice", get(catalog::practice))
    .route("/api/decks", get(decks::list).post(decks::create))
    .route("/api/decks/{id}", get(decks::detail).delete(decks::remove))
    .route("/api/decks/{id}/cards", post(decks::add_card))
    .route("/api/decks/{id}/cards/{card_id}", delete(decks::remove_card))
    .route("/api/goals", get(goals::list).post(goals::create))
    .route("/api/goals/{id}", delete(goals::remove))
    .route("/api/progress", get(progress::summary))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
