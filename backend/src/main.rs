use anyhow::{Context, Result};
use backend::{
    axum_http::http_serve, config::config_loader, usecases::media_upload::MediaUploadUseCase,
};
use crates::infra::{db::mongo_connection, media_host::cloudinary::CloudinaryClient};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!(stage = %dotenvy_env.stage, "ENV has been loaded");

    let database =
        mongo_connection::establish_connection(&dotenvy_env.database.uri, &dotenvy_env.database.name)
            .await
            .context("MongoDB connection failed")?;
    info!(database = %dotenvy_env.database.name, "MongoDB connection has been established");

    let media_host = CloudinaryClient::new(dotenvy_env.cloudinary.clone())?;
    if !media_host.is_configured() {
        warn!("Cloudinary credentials are incomplete; uploads will fail until they are set");
    }
    let media_upload = Arc::new(MediaUploadUseCase::new(Arc::new(media_host)));

    http_serve::start(Arc::new(dotenvy_env), Arc::new(database), media_upload).await?;

    Ok(())
}
