use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use tradepilot_web::{build_router, telemetry, AppState, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::parse();
    telemetry::init(&config.log_filter)?;

    let state = Arc::new(AppState::new(config.build_collaborators()?));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, oracle = ?config.oracle, "tradepilot listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("tradepilot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
