use axum::{Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use crates::infra::db::mongo_connection::{self, MongoDatabase};
use std::sync::Arc;
use tracing::{error, info};

pub fn routes(database: Arc<MongoDatabase>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .with_state(database)
}

/// `200 OK` while MongoDB answers `ping`, `503` otherwise.
pub async fn health_check(State(database): State<Arc<MongoDatabase>>) -> impl IntoResponse {
    info!("backend router: health_check handler invoked");

    match mongo_connection::ping(&database).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(err) => {
            error!(db_error = ?err, "health_check: database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "DATABASE_UNAVAILABLE").into_response()
        }
    }
}
