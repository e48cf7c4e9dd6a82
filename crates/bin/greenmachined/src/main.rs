//! # greenmachined: Green Machine daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`greenmachine.toml`, `GREENMACHINE_*` env vars)
//! - Initialise structured logging
//! - Construct the simulated provider and the optional tip client (adapters)
//! - Construct application services around one shared context
//! - Load the dashboard once, then start the background refresh loop
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use greenmachine_adapter_http_axum::router;
use greenmachine_adapter_http_axum::state::AppState;
use greenmachine_adapter_simulated::SimulatedBackend;
use greenmachine_adapter_tips::GenerativeTipClient;
use greenmachine_app::event_bus::InProcessEventBus;
use greenmachine_app::refresh_loop;
use greenmachine_app::services::ServiceContext;
use greenmachine_app::services::notification_service::NotificationService;
use greenmachine_app::services::tip_service::TipService;

use crate::config::Config;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));

    // Adapters
    let simulation = config.simulation();
    tracing::info!(
        latency_ms = config.simulation.latency_ms,
        conflict_probability = simulation.conflict_probability,
        seed = ?simulation.seed,
        "starting simulated provider"
    );
    let backend = Arc::new(SimulatedBackend::new(simulation));
    let tip_client =
        GenerativeTipClient::from_config(&config.tip_client()).context("failed to build tip client")?;
    if tip_client.is_none() {
        tracing::info!("no tip API key configured, serving canned tips");
    }

    // Services
    let notifications = Arc::new(NotificationService::with_ttl(
        Arc::clone(&event_bus),
        config.notification_ttl(),
    ));
    let ctx = ServiceContext::new(
        backend,
        notifications,
        Arc::clone(&event_bus),
        config.engine(),
    );
    let state = AppState::new(ctx.clone(), event_bus, TipService::new(tip_client));

    if let Err(err) = state.dashboard.load().await {
        tracing::warn!(error = %err, "initial dashboard load failed");
    }
    let refresh = refresh_loop::spawn(ctx, config.refresh_loop());

    // HTTP
    let app = router::build(state);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "greenmachined listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    refresh.shutdown().await;
    tracing::info!("greenmachined stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
