use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sentry_assistant::{Assistant, GeminiClient};
use sentry_db::{MemoryStore, PgStore, Store};
use sentry_events::{NotificationSender, NotifyApiClient, ReportScheduler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentry_api::bootstrap::ensure_admin;
use sentry_api::config::{LogFormat, ServerConfig, StoreBackend};
use sentry_api::router::build_app_router;
use sentry_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sentry_api=debug,sentry_events=debug,tower_http=debug".into());
    match config.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;

            let pool = sentry_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            sentry_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            sentry_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some(admin) = &config.admin {
        ensure_admin(store.as_ref(), admin)
            .await
            .context("Failed to provision admin user")?;
    }

    // --- Notification sender ---
    let sender: Arc<dyn NotificationSender> = Arc::new(
        NotifyApiClient::new(&config.notify_api_url, &config.notify_api_key)
            .context("Failed to build notification client")?,
    );
    if config.notify_api_key.is_empty() {
        tracing::warn!("NOTIFY_API_KEY is empty; notifications will likely be rejected");
    }

    // --- Assistant ---
    let assistant = match config.gemini.clone() {
        Some(gemini) => {
            let client = GeminiClient::new(gemini).context("Failed to build model client")?;
            tracing::info!(model = client.model(), "Assistant enabled");
            Some(Arc::new(
                Assistant::new(Arc::new(client), Arc::clone(&store))
                    .with_max_tool_rounds(config.max_tool_rounds),
            ))
        }
        None => {
            tracing::info!("GEMINI_API_KEY not set; assistant endpoints disabled");
            None
        }
    };

    // --- App state ---
    let state = AppState::new(store, sender, assistant, config.clone());

    // --- Report scheduler ---
    let scheduler_cancel = CancellationToken::new();
    let scheduler_handle = if config.scheduler_enabled {
        tracing::info!(
            "Report scheduler enabled; scheduled calls to /api/cron/send-open-issues-report are ignored"
        );
        let scheduler = ReportScheduler::new(Arc::clone(&state.dispatcher));
        let cancel = scheduler_cancel.clone();
        Some(tokio::spawn(async move {
            scheduler.run(cancel).await;
        }))
    } else {
        tracing::info!("Report scheduler disabled");
        None
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    scheduler_cancel.cancel();
    if let Some(handle) = scheduler_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Report scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
