use std::path::PathBuf;

use anyhow::{Context, Result};
use crates::infra::media_host::cloudinary::{
    CloudinaryConfig, DEFAULT_API_BASE_URL, SignatureAlgorithm,
};

use super::{
    config_model::{BackendServer, Database, DotEnvyConfig, Upload},
    stage::Stage,
};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BODY_LIMIT_MB: u64 = 16;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DB_NAME: &str = "videotube";
const DEFAULT_UPLOAD_TEMP_DIR: &str = "./public/temp";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let stage = var("STAGE")
        .map(|raw| Stage::try_from(&raw).unwrap_or_default())
        .unwrap_or_default();

    let backend_server = BackendServer {
        port: var("PORT")
            .map(|raw| raw.parse::<u16>())
            .transpose()
            .context("PORT is invalid")?
            .unwrap_or(DEFAULT_PORT),
        body_limit: var("SERVER_BODY_LIMIT")
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .context("SERVER_BODY_LIMIT is invalid")?
            .unwrap_or(DEFAULT_BODY_LIMIT_MB),
        timeout: var("SERVER_TIMEOUT")
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .context("SERVER_TIMEOUT is invalid")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        cors_origin: var("CORS_ORIGIN").filter(|origin| origin != "*"),
    };

    let database = Database {
        uri: var("MONGODB_URI").context("MONGODB_URI is invalid")?,
        name: var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
    };

    // Missing credentials are not fatal here; every upload fails until they are set.
    let cloudinary = CloudinaryConfig {
        cloud_name: var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
        api_key: var("CLOUDINARY_API_KEY").unwrap_or_default(),
        api_secret: var("CLOUDINARY_API_SECRET").unwrap_or_default(),
        api_base_url: var("CLOUDINARY_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        signature_algorithm: var("CLOUDINARY_SIGNATURE_ALGORITHM")
            .map(|raw| raw.parse::<SignatureAlgorithm>())
            .transpose()
            .context("CLOUDINARY_SIGNATURE_ALGORITHM is invalid")?
            .unwrap_or_default(),
    };

    let upload = Upload {
        temp_dir: PathBuf::from(
            var("UPLOAD_TEMP_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_TEMP_DIR.to_string()),
        ),
    };

    Ok(DotEnvyConfig {
        stage,
        backend_server,
        database,
        cloudinary,
        upload,
    })
}
