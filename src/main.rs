use dotenvy::dotenv;
use faktura::{
    config::{database, settings},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load invoice, storage and accounting settings
    let settings = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Configuration loaded.");

    // 4. Connect and bring the schema up to date
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    database::migrate(&db, &settings)
        .await
        .inspect(|_| info!("Database migrated successfully."))
        .inspect_err(|e| error!("Failed to migrate database: {}", e))?;

    tokio::fs::create_dir_all(&settings.storage.media_root)
        .await
        .inspect_err(|e| error!("Failed to create media root: {}", e))?;
    info!("Media root is {}", settings.storage.media_root.display());

    Ok(())
}
