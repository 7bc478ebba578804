//! Passage Relay - Bible passage videos for chat
//!
//! Finds Bible citations in Telegram and Messenger messages and answers with
//! American Sign Language videos from the Digital Bible Platform. The same
//! lookup is served as a JSON search API.

mod catalog;
mod common;
mod config;
mod messenger;
mod reply;
mod scripture;
mod telegram;
mod web;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use catalog::DbpCatalog;
use common::error::AppError;
use config::{env::get_config_path, load_and_validate, Config};
use messenger::{MessengerBot, MessengerClient};
use scripture::{BookRegistry, CollectionSettings, PassageResolver};
use telegram::{TelegramBot, TelegramClient};
use web::AppState;

/// Everything built from the configuration before serving.
struct Services {
    config: Config,
    resolver: Arc<PassageResolver>,
    telegram: Option<TelegramBot>,
    messenger: Option<Arc<MessengerBot>>,
}

/// Load configuration and build the resolver and platform adapters.
///
/// Malformed book data or an unusable config aborts startup here.
fn bootstrap(config_path: &str) -> common::error::Result<Services> {
    let config = load_and_validate(config_path)?;

    info!("Configuration loaded successfully");
    info!("  Catalog: {}", config.catalog.url);
    info!(
        "  Collections: {} (OT), {} (NT)",
        config.catalog.old_testament_collection, config.catalog.new_testament_collection
    );

    let registry = Arc::new(BookRegistry::new()?);
    info!("Book registry ready: {} books", registry.len());

    let catalog = Arc::new(DbpCatalog::new(&config.catalog)?);
    let settings = CollectionSettings::from_config(&config.catalog);
    let resolver = Arc::new(PassageResolver::new(registry, catalog, settings)?);

    let telegram = match config.telegram {
        Some(ref telegram) => {
            let poll_interval = Duration::from_secs(telegram.poll_interval_secs);
            let client = TelegramClient::new(&telegram.token, poll_interval)?;
            info!("  Telegram: enabled (poll {}s)", telegram.poll_interval_secs);
            Some(TelegramBot::new(client, resolver.clone(), poll_interval))
        }
        None => {
            info!("  Telegram: disabled");
            None
        }
    };

    let messenger = match config.messenger {
        Some(ref messenger) => {
            let client = MessengerClient::new(&messenger.page_access_token)?;
            if messenger.app_secret.is_none() {
                warn!("  Messenger: app_secret not set, webhook signatures are not checked");
            }
            info!("  Messenger: enabled");
            Some(Arc::new(MessengerBot::new(
                client,
                resolver.clone(),
                messenger.verify_token.clone(),
                messenger.app_secret.clone(),
            )))
        }
        None => {
            info!("  Messenger: disabled");
            None
        }
    };

    Ok(Services {
        config,
        resolver,
        telegram,
        messenger,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Passage Relay v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let services = bootstrap(&config_path).map_err(|e| {
        error!("Startup failed: {}", e);
        if matches!(e, AppError::Config(_)) {
            error!("Please ensure {} exists and is properly formatted.", config_path);
            error!("See passage-relay.conf.example for reference.");
        }
        e
    })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let telegram_task: Option<JoinHandle<()>> = services.telegram.map(|bot| {
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move { bot.run(shutdown_rx).await })
    });

    let server_config = services.config.server();
    let state = AppState {
        resolver: services.resolver,
        messenger: services.messenger,
    };
    let mut server_task = tokio::spawn(async move {
        if let Err(e) = web::start_http_server(state, &server_config, shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping...");
            true
        }
        _ = &mut server_task => false,
    };

    if let Err(e) = shutdown_tx.send(true) {
        warn!("Shutdown channel closed: {}", e);
    }

    let timeout = Duration::from_secs(5);
    if shutdown {
        match tokio::time::timeout(timeout, server_task).await {
            Ok(Ok(())) => info!("HTTP server stopped gracefully"),
            Ok(Err(e)) => warn!("HTTP server task panicked: {}", e),
            Err(_) => warn!("HTTP server shutdown timed out"),
        }
    }
    if let Some(task) = telegram_task {
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(())) => info!("Telegram polling stopped gracefully"),
            Ok(Err(e)) => warn!("Telegram task panicked: {}", e),
            Err(_) => warn!("Telegram shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
