use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocrd::api::{create_router, AppState};
use ocrd::config::Config;
use ocrd::ocr::InferenceEngine;

#[derive(Parser)]
#[command(name = "ocrd")]
#[command(about = "Self-hostable OCR inference server")]
struct Args {
    /// Load configuration and the OCR model, then exit without serving
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ocrd=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = Config::from_env();

    tracing::info!("Loading OCR model: {}...", config.ocr.model);
    // Startup phase: nothing is served until the model is loaded.
    let engine = match tokio::task::block_in_place(|| InferenceEngine::load(&config.ocr)) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Cannot start without a ready OCR engine: {}", e);
            return Err(e.into());
        }
    };

    if args.check {
        tracing::info!("Configuration and OCR model OK");
        return Ok(());
    }

    let state = AppState::new(config.clone(), Arc::new(engine));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("ocrd starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!(
        "  Batch limits: {} items, concurrency {}, timeout {}s",
        config.batch.max_items,
        config.batch.concurrency,
        config.batch.timeout_secs
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
