use anyhow::Result;
use school_ledger::config::LedgerSettings;
use school_ledger::{create_router, initialize_backend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = LedgerSettings::config_path();
    info!("Loading settings from {}", config_path.display());
    let settings = LedgerSettings::load_or_create(&config_path)?;
    let bind_address = settings.bind_address.clone();

    let app_state = initialize_backend(settings).await?;
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on {}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
