use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use talent_archaeologist::channels::CliChannel;
use talent_archaeologist::config::AppConfig;
use talent_archaeologist::excavation::{
    AnalysisClient, ExcavationManager, ExcavationRouteState, excavation_routes,
};
use talent_archaeologist::llm::create_provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let _log_guard = init_tracing(&config);

    eprintln!("⛏️  Talent Archaeologist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {} ({})", config.llm.backend, config.llm.model);
    if config.llm.api_key.is_none() {
        eprintln!(
            "   Warning: no API key set (TALENT_API_KEY or {}); analysis will fail",
            config.llm.backend.key_env_var()
        );
    }

    let llm = create_provider(&config.llm)?;
    let manager = ExcavationManager::new(AnalysisClient::new(llm, config.analysis.clone()));

    if let Some(port) = config.http_port {
        let app = excavation_routes(ExcavationRouteState {
            manager: manager.clone(),
        });
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
            .await
            .with_context(|| format!("Failed to bind HTTP port {}", port))?;
        eprintln!("   Session API: http://0.0.0.0:{}/api/session", port);
        tokio::spawn(async move {
            tracing::info!(port, "Session API started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Session API stopped");
            }
        });
    }

    eprintln!("   Commands: /back, /reset, /quit\n");

    CliChannel::new(manager).run().await?;
    Ok(())
}

/// Log to stderr, or to daily rolling files when a log directory is configured.
fn init_tracing(config: &AppConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, "talent-archaeologist.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            None
        }
    }
}
