use axum::{Router, routing::{get, post}};

use crate::handlers::{self, DbConn};

/// The §6 HTTP surface: run a batch, read back the last persisted result,
/// inspect one band's per-age trace, and compare up to three plans.
pub fn simulation_routes() -> Router<DbConn> {
    Router::new()
        .route("/api/simulate/{plan_id}", post(handlers::simulate_plan))
        .route("/api/simulate/{plan_id}/results", get(handlers::get_last_result))
        .route("/api/simulate/{plan_id}/debug", get(handlers::get_band_debug))
        .route("/api/simulate/compare", post(handlers::compare_plans))
}
