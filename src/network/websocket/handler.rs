use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::game::game_coordinator::TurnCoordinator;
use crate::game::session::SessionEvent;
use crate::game::PlayerId;
use crate::network::messages::{ClientMessage, ServerResponse};
use crate::{AppError, AppResult};

/// Per-connection view of the game: which identity this socket joined as.
pub struct MessageHandler {
    connection_id: String,
    identity: Option<PlayerId>,
    coordinator: Arc<TurnCoordinator>,
    update_sender: mpsc::UnboundedSender<SessionEvent>,
}

impl MessageHandler {
    pub fn new(
        connection_id: String,
        coordinator: Arc<TurnCoordinator>,
        update_sender: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            connection_id,
            identity: None,
            coordinator,
            update_sender,
        }
    }

    pub fn identity(&self) -> Option<PlayerId> {
        self.identity
    }

    /// Runs one request. Errors are answered to this connection only.
    pub async fn handle(&mut self, message: ClientMessage) -> Option<ServerResponse> {
        debug!("📨 {} -> {:?}", self.connection_id, message);

        match self.dispatch(message).await {
            Ok(response) => response,
            Err(app_error) => {
                if app_error.should_log() {
                    error!("Connection {}: {}", self.connection_id, app_error);
                } else {
                    debug!("Connection {} rejected: {}", self.connection_id, app_error);
                }
                Some(ServerResponse::from_app_error(&app_error))
            }
        }
    }

    async fn dispatch(&mut self, message: ClientMessage) -> AppResult<Option<ServerResponse>> {
        match message {
            ClientMessage::Ping => Ok(Some(ServerResponse::Pong)),
            ClientMessage::JoinGame => {
                let outcome = self
                    .coordinator
                    .join_game(&self.connection_id, self.update_sender.clone())
                    .await?;
                self.identity = Some(outcome.identity);

                Ok(Some(ServerResponse::Joined {
                    identity: outcome.identity,
                    players_allowed: outcome.players_allowed,
                    must_configure: outcome.must_configure,
                    rules: outcome.rules,
                }))
            }
            ClientMessage::LeaveGame => {
                if let Some(identity) = self.identity.take() {
                    self.coordinator.leave_game(identity).await;
                    return Ok(Some(ServerResponse::Left));
                }
                Ok(None)
            }
            ClientMessage::NextPlayerTurn { chosen } => {
                let identity = self.identity.ok_or(AppError::NotJoined)?;
                self.coordinator.next_player_turn(identity, chosen).await?;
                Ok(None)
            }
            ClientMessage::SetNumberPlayerAllowed { count } => {
                self.identity.ok_or(AppError::NotJoined)?;
                self.coordinator.set_number_player_allowed(count).await?;
                Ok(Some(ServerResponse::Configured {
                    players_allowed: count,
                }))
            }
            ClientMessage::GetNumberOfPlayers => Ok(Some(ServerResponse::NumberOfPlayers {
                count: self.coordinator.get_number_of_players().await,
            })),
        }
    }

    /// Drops this connection from the game if it joined.
    pub async fn disconnect(&mut self) {
        if let Some(identity) = self.identity.take() {
            self.coordinator.leave_game(identity).await;
        }
    }
}
