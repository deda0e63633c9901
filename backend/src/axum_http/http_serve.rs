use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::media_upload::MediaUploadUseCase,
};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
};
use crates::{
    domain::repositories::media_host::MediaHostClient,
    infra::db::mongo_connection::MongoDatabase,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub fn build_router<H>(
    config: &DotEnvyConfig,
    database: Arc<MongoDatabase>,
    media_upload: Arc<MediaUploadUseCase<H>>,
) -> Result<Router>
where
    H: MediaHostClient + Send + Sync + 'static,
{
    let cors = match config.backend_server.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .context("CORS_ORIGIN is not a valid header value")?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST])
    .allow_headers([CONTENT_TYPE]);

    let router = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/media",
            routers::media::routes(media_upload, config.upload.temp_dir.clone()),
        )
        .nest("/api/v1/health-check", routers::health::routes(database))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        // The multipart extractor has its own 2MB default; the layer below is the real cap.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes(
            config.backend_server.body_limit,
        )?))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

fn body_limit_bytes(megabytes: u64) -> Result<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .with_context(|| format!("SERVER_BODY_LIMIT is invalid (value: {megabytes})"))
}

pub async fn start<H>(
    config: Arc<DotEnvyConfig>,
    database: Arc<MongoDatabase>,
    media_upload: Arc<MediaUploadUseCase<H>>,
) -> Result<()>
where
    H: MediaHostClient + Send + Sync + 'static,
{
    let app = build_router(&config, database, media_upload)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind port {}", config.backend_server.port))?;

    info!("Server is running at port: {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = ?err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
