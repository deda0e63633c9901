use anyhow::{Context, Result};
use mongodb::{Client, Database, bson::doc, options::ClientOptions};

pub type MongoDatabase = Database;

const APP_NAME: &str = "media-gateway";

/// Opens one client for `database_uri`, selects `database_name` and checks
/// the server answers before handing the handle out.
pub async fn establish_connection(database_uri: &str, database_name: &str) -> Result<MongoDatabase> {
    let mut options = ClientOptions::parse(database_uri)
        .await
        .context("invalid MONGODB_URI")?;
    options.app_name = Some(APP_NAME.to_string());

    let client = Client::with_options(options).context("failed to build MongoDB client")?;
    let database = client.database(database_name);

    ping(&database)
        .await
        .with_context(|| format!("MongoDB did not answer ping for database {}", database_name))?;

    Ok(database)
}

pub async fn ping(database: &MongoDatabase) -> Result<()> {
    database.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
