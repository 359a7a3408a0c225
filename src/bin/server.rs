//! Motivator HTTP server binary.
//!
//! Starts an axum HTTP server exposing the motivator pipeline.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 8080)
//! - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` - Required Bedrock credentials
//! - `AWS_REGION` (or `AWS_DEFAULT_REGION`) - Required Bedrock region
//! - `MOTIVATOR_MODEL_ID` - Model to invoke (default: us.deepseek.r1-v1:0)
//! - `MOTIVATOR_KNOWLEDGE_PATH` - Optional YAML knowledge base replacing the curated table
//! - `RUST_LOG` - Tracing filter (default: "info,motivator=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use motivator::server::{app_router, AppState};
use motivator::{BedrockCompletion, Motivator, MotivatorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Library code logs through `log`; route it into the subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,motivator=debug".into()),
        )
        .init();

    let config = MotivatorConfig::from_env().context("Invalid configuration")?;
    let knowledge = config
        .load_knowledge_base()
        .context("Failed to load knowledge base")?;
    let service = BedrockCompletion::from_config(&config)
        .context("Failed to build Bedrock client")?;

    tracing::info!(
        "Using model {} in {} ({} curated emotions)",
        config.model_id,
        config.region,
        knowledge.len()
    );

    let motivator = Motivator::new(Arc::new(service), Arc::new(knowledge))
        .with_match_strategy(config.match_strategy);
    let app = app_router(AppState::new(motivator));

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    tracing::info!("motivator server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health   - liveness probe");
    tracing::info!("  POST /motivate - feeling to verse and encouragement");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
