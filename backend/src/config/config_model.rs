use std::path::PathBuf;

use crates::infra::media_host::cloudinary::CloudinaryConfig;

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub cloudinary: CloudinaryConfig,
    pub upload: Upload,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// Megabytes.
    pub body_limit: u64,
    /// Seconds.
    pub timeout: u64,
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub temp_dir: PathBuf,
}
