use num_bingo::client::{run_client, ClientSession, CoordinatorLink, TerminalConsole, WebsocketLink};
use num_bingo::network::messages::ClientMessage;
use num_bingo::ClientConfig;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = ClientConfig::from_env();

    let (session, view) = ClientSession::new();
    let link = WebsocketLink::connect(&config.server_url, session).await?;
    let mut console = TerminalConsole::new();

    tokio::select! {
        outcome = run_client(&link, view, &mut console) => {
            let outcome = outcome?;
            match outcome.own_pattern {
                Some(pattern) => println!("Bingo! {}", pattern),
                None => println!("No bingo"),
            }
        }
        _ = signal::ctrl_c() => {
            info!("🛑 Leaving the game");
            link.send(ClientMessage::LeaveGame).await?;
        }
    }

    // Give the writer a moment to flush the last frame.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    Ok(())
}
