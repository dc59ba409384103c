use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::client::session_loop::{ClientSession, CoordinatorLink};
use crate::network::messages::{deserialize_response, serialize_message, ClientMessage};
use crate::{AppError, AppResult};

/// Coordinator link over a websocket. Responses and pushed updates are fed
/// into the `ClientSession` by a reader task.
pub struct WebsocketLink {
    outgoing: mpsc::UnboundedSender<ClientMessage>,
}

impl WebsocketLink {
    pub async fn connect(url: &str, session: ClientSession) -> AppResult<Self> {
        let (ws_stream, _) = connect_async(url).await?;
        info!("🔌 Connected to {}", url);

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (outgoing, mut outgoing_receiver) = mpsc::unbounded_channel::<ClientMessage>();

        tokio::spawn(async move {
            while let Some(message) = outgoing_receiver.recv().await {
                let text = match serialize_message(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("❌ Could not encode {:?}: {}", message, e);
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(Message::Text(text)).await {
                    warn!("❌ Failed to write to coordinator: {}", e);
                    break;
                }
            }
            let _ = ws_sender.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = ws_receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => match deserialize_response(&text) {
                        Ok(response) => session.apply(response),
                        Err(e) => debug!("Unparseable frame from coordinator: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("❌ Read error from coordinator: {}", e);
                        break;
                    }
                }
            }
            info!("📴 Coordinator connection closed");
            session.close();
        });

        Ok(Self { outgoing })
    }
}

#[async_trait]
impl CoordinatorLink for WebsocketLink {
    async fn send(&self, message: ClientMessage) -> AppResult<()> {
        self.outgoing
            .send(message)
            .map_err(|_| AppError::ConnectionClosed)
    }
}
