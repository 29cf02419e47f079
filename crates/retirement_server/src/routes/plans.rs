use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::handlers::{self, DbConn};

pub fn plan_routes() -> Router<DbConn> {
    Router::new()
        .route("/api/plans", get(handlers::list_plans))
        .route("/api/plans", post(handlers::create_plan))
        .route("/api/plans/{id}", get(handlers::get_plan))
        .route("/api/plans/{id}", put(handlers::update_plan))
        .route("/api/plans/{id}", delete(handlers::delete_plan))
}
