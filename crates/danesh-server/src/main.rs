//! danesh-server - HTTP server binary.

use std::net::SocketAddr;

use danesh_server::{create_orchestrator, create_server, load_config, logging, AppState};
use tokio::signal;
use tracing::{error, info};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    logging::init("danesh_server=debug");

    let host = std::env::var("DANESH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("DANESH_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    let config = load_config(None)?;
    let orchestrator = create_orchestrator(&config).await?;
    info!(
        "Orchestrator ready (strategy {:?}, top_k {}, graph {})",
        config.retrieval.strategy,
        config.retrieval.top_k,
        orchestrator.has_graph()
    );

    let app = create_server(AppState::new(orchestrator));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting danesh-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
