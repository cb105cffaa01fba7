//! Assignment solver server binary
//!
//! Run with: cargo run -p assignment-solver --bin assignment-solver-server

use assignment_solver::{config::SolverConfig, server::SolverServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assignment_solver=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (.env, optional TOML file, environment)
    let config = SolverConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Model endpoint: {}", config.llm.base_url);
    tracing::info!("  - Model: {}", config.llm.model);
    tracing::info!("  - Model timeout: {}s", config.llm.timeout_secs);
    tracing::info!("  - Answer table: {} entries", config.answers.entries.len());
    tracing::info!("  - Max upload: {} bytes", config.server.max_upload_size);

    let server = SolverServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("\nEndpoints:");
    println!("  GET  /     - Welcome message");
    println!("  POST /api/ - Answer a question (multipart: question, file)");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
