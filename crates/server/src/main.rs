use clap::Parser;
use ironplan_server::{AppState, cli::Cli, logging, routes};
use ironplan_storage::Sqlite;
use tracing::{error, info};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to wait for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    logging::init(cli.log_level)?;

    let db = Sqlite::open(&cli.database).await?;
    let listener = tokio::net::TcpListener::bind(cli.socket()).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::router(AppState::new(db)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
