mod db;
mod error;
mod handlers;
mod models;
mod routes;
mod validation;

use axum::{Router, routing::get};
use handlers::DbConn;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let conn = Connection::open("retirement_plans.db").expect("failed to open database");
    db::init_db(&conn).expect("failed to initialize database");
    let db_conn: DbConn = Arc::new(Mutex::new(conn));

    let app = Router::new()
        .route("/", get(|| async { "Retirement planning API server" }))
        .merge(routes::plan_routes())
        .merge(routes::simulation_routes())
        .with_state(db_conn)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001")
        .await
        .expect("failed to bind to port 3001");

    tracing::info!(addr = %listener.local_addr().unwrap(), "retirement planning API server listening");

    axum::serve(listener, app).await.expect("server failed");
}
