use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use scene_partner_backend::infrastructure::config::{Config, LogFormat};
use scene_partner_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use scene_partner_backend::infrastructure::http::{build_app, start_http_server};
use scene_partner_backend::infrastructure::repositories::OpenAiScriptModelRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Scene Partner Backend on {}:{}",
        config.host,
        config.port
    );

    // Open the local database and bring its schema up to date
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    check_connection(&pool).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    // Script parsing model client
    let openai_client = OpenAiScriptModelRepository::client_from(
        &config.openai_api_key,
        config.openai_api_base.as_deref(),
    );
    tracing::info!(
        model = %config.parser_model,
        custom_api_base = config.openai_api_base.is_some(),
        "Script parser client initialized"
    );
    let model_repo = Arc::new(OpenAiScriptModelRepository::new(
        Arc::new(openai_client),
        config.parser_model.clone(),
    ));

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    let app = build_app(pool, config.clone(), model_repo).await;

    start_http_server(app, config).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "scene_partner_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "scene_partner_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
