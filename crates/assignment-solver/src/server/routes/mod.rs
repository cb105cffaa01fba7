//! API routes for the solver server

pub mod solve;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Both spellings: clients post to `/api/`, some tools drop the slash
        .route(
            "/api/",
            post(solve::solve_assignment).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/api",
            post(solve::solve_assignment).layer(DefaultBodyLimit::max(max_upload_size)),
        )
}
