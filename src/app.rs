use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rest/v1/:table", get(handlers::list_rows).post(handlers::insert_rows))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
