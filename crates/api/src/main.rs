//! `storefront-api` -- storefront event consumer host.
//!
//! Serves the WebSocket endpoint real-time clients subscribe to and runs
//! the SQS consumer for the lifetime of the process.
//!
//! # Environment variables
//!
//! | Variable            | Required | Description                            |
//! |---------------------|----------|----------------------------------------|
//! | `AWS_SQS_QUEUE_URL` | yes      | Queue the consumer polls               |
//! | `AWS_REGION`        | yes      | Read by the AWS configuration chain    |
//! | `SMTP_HOST`         | no       | Enables welcome email delivery         |
//! | `EVENT_BUS_NAME`    | no       | Enables `POST /api/v1/events`          |
//!
//! See [`ServerConfig`], [`PollerConfig`](storefront_consumer::PollerConfig)
//! and [`EmailConfig`] for the remaining tunables.

use std::sync::Arc;
use std::time::Duration;

use storefront_consumer::handlers::register_defaults;
use storefront_consumer::queue::SqsQueue;
use storefront_consumer::{Dispatcher, Poller};
use storefront_core::notify::{Broadcaster, WelcomeMailer};
use storefront_events::{DisabledMailer, EmailConfig, EmailDelivery, EventPublisher};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::config::ServerConfig;
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "storefront_api=debug,storefront_consumer=debug,storefront_events=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        addr = %config.bind_addr,
        queue_url = %config.consumer.queue_url,
        shutdown_grace_secs = config.shutdown_grace.as_secs(),
        "Loaded configuration"
    );

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), heartbeat_cancel.clone());

    // --- Email ---
    let mailer: Arc<dyn WelcomeMailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            let host = email_config.smtp_host.clone();
            match EmailDelivery::new(email_config) {
                Ok(delivery) => {
                    tracing::info!(smtp_host = %host, "Email delivery configured");
                    Arc::new(delivery)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid SMTP configuration, email delivery disabled");
                    Arc::new(DisabledMailer)
                }
            }
        }
        None => {
            tracing::warn!("SMTP_HOST not set, welcome emails will not be sent");
            Arc::new(DisabledMailer)
        }
    };

    // --- Event publisher ---
    let publisher = if std::env::var("EVENT_BUS_NAME").is_ok() {
        let publisher = EventPublisher::from_env().await;
        tracing::info!(bus = publisher.bus_name(), "Event publishing enabled");
        Some(Arc::new(publisher))
    } else {
        None
    };

    // --- Consumer ---
    let queue = SqsQueue::from_env(config.consumer.queue_url.clone()).await;
    tracing::info!(queue_url = queue.queue_url(), "SQS client created");

    let broadcaster: Arc<dyn Broadcaster> = ws_manager.clone();
    let mut dispatcher = Dispatcher::new();
    register_defaults(&mut dispatcher, mailer, broadcaster);

    let poller = Arc::new(Poller::new(
        Arc::new(queue),
        dispatcher,
        config.consumer.poller.clone(),
    ));
    poller.start();

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        poller: Arc::clone(&poller),
        publisher,
    };

    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(addr = %config.bind_addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Let the consumer finish its in-flight receive and batch.
    poller.stop();
    if poller.join(config.shutdown_grace).await {
        tracing::info!("Queue consumer stopped");
    }

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), heartbeat_handle).await;
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
