use std::sync::Arc;

use anyhow::anyhow;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herald::app::broker::Broker;
use herald::config::AppConfig;
use herald::infra::db::Db;
use herald::infra::directory::UserDirectory;
use herald::infra::mailer::{DisabledMailer, Mailer, RelayMailer};
use herald::infra::memory::{MemoryDirectory, MemoryStore};
use herald::infra::postgres::{self, PostgresDirectory, PostgresStore};
use herald::infra::store::NotificationStore;
use herald::{http, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let (store, directory): (Arc<dyn NotificationStore>, Arc<dyn UserDirectory>) =
        match config.store_backend.as_str() {
            "postgres" => {
                let db = Db::connect(&config).await?;
                postgres::ensure_schema(&db).await?;
                (
                    Arc::new(PostgresStore::new(db.clone())),
                    Arc::new(PostgresDirectory::new(db)),
                )
            }
            "memory" => {
                tracing::warn!("using in-memory store, notifications are lost on restart");
                (
                    Arc::new(MemoryStore::new()),
                    Arc::new(MemoryDirectory::new()),
                )
            }
            other => return Err(anyhow!("unknown STORE_BACKEND: {}", other)),
        };

    let mailer: Arc<dyn Mailer> = match &config.mail_relay_url {
        Some(relay_url) => Arc::new(RelayMailer::new(
            relay_url.clone(),
            config.mail_relay_token.clone(),
            config.mail_from.clone(),
        )),
        None => Arc::new(DisabledMailer),
    };

    let state = AppState {
        store,
        directory,
        mailer,
        broker: Arc::new(Broker::default()),
    };

    let app: Router = http::router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
