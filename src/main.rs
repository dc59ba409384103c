use num_bingo::network::websocket::WebsocketServer;
use num_bingo::{ServerConfig, TurnCoordinator};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        "🎮 Starting NumBingo coordinator: {}x{} card, {} picks, {}-{} players",
        config.rules.rows,
        config.rules.cols,
        config.rules.picks,
        config.rules.min_players,
        config.rules.max_players
    );
    if let Some(timeout) = config.turn_timeout {
        info!("⏰ Turns expire after {:?}", timeout);
    }

    let coordinator = TurnCoordinator::from_config(&config)?;
    let server = WebsocketServer::bind(&config.bind_address, coordinator).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = signal::ctrl_c() => info!("🛑 Shutting down"),
    }
    Ok(())
}
