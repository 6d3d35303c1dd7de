//! Main entry point for the Fomento server.
//!
//! Boots configuration and logging, runs the database migrations, starts the
//! background scheduler, and serves the HTTP API until shutdown.

use std::sync::Arc;

use fomento_agents::{AgentManager, scheduler};
use fomento_migration::{Migrator, MigratorTrait};
use fomento_server::{
    model::{AppState, Configuration},
    startup,
};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize configuration and logging
    let configuration = Configuration::new();

    let logging_config = configuration.logging_config();
    let _logging_guards = startup::init_logging(&logging_config)?;

    let server_address = configuration.server_address();
    let server_port = configuration.server_port();

    // Database and schema
    let database_connection = configuration.database_connection().await?;
    Migrator::up(&database_connection, None).await?;
    info!("Database ready at {}", configuration.database_url());

    // Pipeline manager and shared state
    let agent_manager = Arc::new(AgentManager::new(
        database_connection.clone(),
        configuration.to_agents_config(),
    ));

    if !agent_manager.retrieval_enabled() {
        info!("Semantic retrieval disabled; search will fall back to keyword matching");
    }

    let scheduler_config = configuration.to_scheduler_config();

    let app_state = Arc::new(AppState {
        configuration,
        database_connection,
        agent_manager: agent_manager.clone(),
    });

    // Shutdown handling and background scheduler
    let shutdown_signal = startup::wait_for_shutdown_signal().await;
    let scheduler_handle = scheduler::start(
        agent_manager,
        scheduler_config,
        shutdown_signal.subscribe(),
    );

    // HTTP server
    info!("Starting Fomento API on {}:{}", server_address, server_port);
    let server = startup::api_server(app_state, server_address, server_port)?;

    let mut shutdown_rx = shutdown_signal.subscribe();
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("API server shutting down gracefully");
        }
    }

    // Stop the scheduler loop if it is still waiting on its next tick
    shutdown_signal.shutdown();
    if let Err(e) = scheduler_handle.await {
        error!("Scheduler task failed: {}", e);
    }

    info!("Fomento server shutdown complete");
    Ok(())
}
