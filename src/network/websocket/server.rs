use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

use crate::game::game_coordinator::TurnCoordinator;
use crate::network::websocket::connection::ConnectionHandler;
use crate::{AppError, AppResult};

pub struct WebsocketServer {
    listener: TcpListener,
    coordinator: Arc<TurnCoordinator>,
}

impl WebsocketServer {
    pub async fn bind(address: &str, coordinator: Arc<TurnCoordinator>) -> AppResult<Self> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| AppError::Configuration {
                key: "BINGO_BIND_ADDR".to_string(),
                reason: format!("cannot bind {}: {}", address, e),
            })?;
        Ok(Self {
            listener,
            coordinator,
        })
    }

    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| AppError::Internal {
                message: e.to_string(),
            })
    }

    pub async fn run(self) -> AppResult<()> {
        info!("🌐 NumBingo coordinator listening on {}", self.local_addr()?);

        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("❌ Failed to accept connection: {}", e);
                    continue;
                }
            };
            info!("🔗 New connection from: {}", addr);
            let connection_id = Uuid::new_v4().to_string();
            let coordinator = self.coordinator.clone();

            tokio::spawn(async move {
                if let Err(e) =
                    ConnectionHandler::handle_connection(stream, connection_id, coordinator).await
                {
                    error!("❌ Error handling connection: {}", e);
                }
            });
        }
    }
}
