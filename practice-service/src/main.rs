use practice_service::config::PracticeConfig;
use practice_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = PracticeConfig::load()?;

    init_tracing("practice-service", "info");

    tracing::info!(
        port = config.common.port,
        database = %config.mongodb.database,
        "Starting practice service"
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
