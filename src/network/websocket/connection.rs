use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::game::game_coordinator::TurnCoordinator;
use crate::game::session::SessionEvent;
use crate::network::messages::{deserialize_message, serialize_response, ServerResponse};
use crate::network::websocket::handler::MessageHandler;
use crate::{AppError, AppResult};

pub struct ConnectionHandler;

impl ConnectionHandler {
    pub async fn handle_connection(
        stream: TcpStream,
        connection_id: String,
        coordinator: Arc<TurnCoordinator>,
    ) -> AppResult<()> {
        let ws_stream = accept_async(stream).await?;
        info!("✅ WebSocket connection {} established", connection_id);

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (response_sender, mut response_receiver) = mpsc::unbounded_channel::<ServerResponse>();
        let (update_sender, mut update_receiver) = mpsc::unbounded_channel::<SessionEvent>();

        // Replies and pushed updates share one socket writer.
        let writer_id = connection_id.clone();
        let writer = tokio::spawn(async move {
            loop {
                let response = tokio::select! {
                    Some(response) = response_receiver.recv() => response,
                    Some(event) = update_receiver.recv() => ServerResponse::from(event),
                    else => break,
                };
                let text = serialize_response(&response)?;
                if let Err(e) = ws_sender.send(Message::Text(text)).await {
                    warn!("❌ Failed to write to {}: {}", writer_id, e);
                    return Err(AppError::from(e));
                }
            }
            let _ = ws_sender.close().await;
            Ok::<(), AppError>(())
        });

        let _ = response_sender.send(ServerResponse::ConnectionId {
            connection_id: connection_id.clone(),
        });

        let mut handler = MessageHandler::new(connection_id.clone(), coordinator, update_sender);

        while let Some(msg) = ws_receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("❌ Read error on {}: {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let response = match deserialize_message(&text) {
                        Ok(message) => handler.handle(message).await,
                        Err(app_error) => {
                            debug!("Unparseable message from {}: {}", connection_id, text);
                            Some(ServerResponse::from_app_error(&app_error))
                        }
                    };
                    if let Some(response) = response {
                        if response_sender.send(response).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    info!("👋 Connection {} requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }

        // Leaving drops the registry's update sender; with the reply sender
        // gone too, the writer drains and exits.
        handler.disconnect().await;
        drop(handler);
        drop(response_sender);
        let _ = writer.await;

        info!("📴 Connection {} closed", connection_id);
        Ok(())
    }
}
