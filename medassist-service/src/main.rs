use medassist_service::{
    build_router,
    config::MedAssistConfig,
    db,
    services::{
        init_metrics,
        providers::{GeminiConfig, GeminiTextProvider, TextProvider},
        AiGateway, Database,
    },
    AppState,
};
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = MedAssistConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics()?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting medassist service"
    );

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migrations failed: {}", e)))?;

    let database = Arc::new(Database::new(pool));

    let assistant = AiGateway::new(build_provider(&config)?);

    let state = AppState::new(config.clone(), database.clone(), database, assistant);
    state.hospitals.seed_if_empty().await?;

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

/// Gemini provider when an API key is configured. The service still starts without one.
fn build_provider(config: &MedAssistConfig) -> Result<Option<Arc<dyn TextProvider>>, AppError> {
    let Some(api_key) = config.gemini.api_key.clone() else {
        tracing::warn!("GEMINI_API_KEY not set; symptom analysis disabled, emergency chat uses fallback text");
        return Ok(None);
    };

    let provider = GeminiTextProvider::new(GeminiConfig {
        api_key,
        model: config.gemini.model.clone(),
    })
    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

    tracing::info!(model = %provider.model(), "Gemini provider configured");
    let provider: Arc<dyn TextProvider> = Arc::new(provider);
    Ok(Some(provider))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
