use veridoc_api::setup;
use veridoc_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration (reads .env when present)
    let config = Config::from_env()?;

    veridoc_api::telemetry::init_telemetry();

    // Initialize the application (database, storage, services, routes)
    let (state, router) = setup::initialize_app(config).await?;

    // Start the server
    setup::server::start_server(state, router).await?;

    Ok(())
}
