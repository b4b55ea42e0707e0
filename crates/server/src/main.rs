//! Shopchat Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use shopchat_agent::{build_strategy, SessionManager};
use shopchat_catalog::CatalogStore;
use shopchat_config::{load_settings, Lexicon, Settings};
use shopchat_llm::{ChatCompletionsClient, CompletionGateway, GatewayConfig};
use shopchat_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("SHOPCHAT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!("Starting shopchat server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let catalog = match CatalogStore::load_from_dir(&config.catalog.data_dir) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::error!(
                data_dir = %config.catalog.data_dir,
                error = %e,
                "Failed to load catalog"
            );
            std::process::exit(1);
        }
    };

    let gateway: Arc<dyn CompletionGateway> =
        match ChatCompletionsClient::new(GatewayConfig::from_settings(&config.llm)) {
            Ok(client) => {
                tracing::info!(
                    endpoint = %config.llm.endpoint,
                    model = %config.llm.model,
                    "Completion gateway ready"
                );
                Arc::new(client)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create completion gateway");
                std::process::exit(1);
            }
        };

    let lexicon = Lexicon::load_or_default(config.lexicon_path.as_deref());
    let strategy = build_strategy(&config.composer, lexicon, catalog.clone(), gateway)?;
    tracing::info!(strategy = ?config.composer.strategy, "Response strategy built");

    let sessions = Arc::new(SessionManager::new(strategy, config.session.max_sessions));
    spawn_idle_eviction(sessions.clone(), config.session.idle_timeout_seconds);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(config, catalog, sessions);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Periodically evict sessions idle past the configured timeout
fn spawn_idle_eviction(sessions: Arc<SessionManager>, idle_timeout_seconds: u64) {
    let interval = Duration::from_secs(idle_timeout_seconds.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            sessions.evict_idle(idle_timeout_seconds);
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("shopchat={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
