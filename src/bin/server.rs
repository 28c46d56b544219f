use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use slimjourney_server::{
    api::water::WaterGoal,
    app::{build_app, Services},
    config::AppConfig,
    gemini::{DisabledGenerator, GeminiClient, TextGenerator},
    migrator,
    prompts::Prompts,
};
use tower_cookies::Key;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    slimjourney_server::telemetry::init_telemetry("slimjourney-server")?;

    let config = AppConfig::from_env()?;

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    migrator::Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    slimjourney_server::metrics::init_metrics(&db).await;

    let generator: Arc<dyn TextGenerator> = match &config.gemini.api_key {
        Some(api_key) => Arc::new(GeminiClient::new(api_key, &config.gemini.model)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, AI suggestions will use fallbacks");
            Arc::new(DisabledGenerator)
        }
    };

    let session_key = match &config.session_secret {
        Some(secret) => Key::from(secret.as_bytes()),
        None => {
            tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
            Key::generate()
        }
    };

    let services = Services {
        db: Arc::new(db),
        session_key,
        generator,
        prompts: Arc::new(Prompts::new()?),
        water_goal: WaterGoal(config.water_goal_ml),
        cors_origin: config
            .cors_origin
            .parse()
            .context("CORS_ORIGIN is not a valid header value")?,
    };

    let app = build_app(services, Some((prometheus_layer, metric_handle)));

    let addr = config.bind_addr()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
