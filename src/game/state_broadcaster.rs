use tracing::{debug, warn};

use crate::game::registry::{ClientHandle, SessionRegistry};
use crate::game::session::{SessionEvent, TurnUpdate};
use crate::game::PlayerId;
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Unreachable,
}

pub struct StateBroadcaster;

impl StateBroadcaster {
    /// Sends `update` to every registered client in join order. A closed
    /// recipient is reported and skipped; the rest still receive the update.
    pub fn notify(registry: &SessionRegistry, update: &TurnUpdate) -> Vec<(PlayerId, Delivery)> {
        debug!(
            "📢 Broadcasting turn {} (next: #{}, over: {}) to {} clients",
            update.turn_counter,
            update.next_active,
            update.game_over,
            registry.count()
        );

        registry
            .handles()
            .iter()
            .map(|handle| {
                let event = SessionEvent::Update(update.clone());
                (handle.identity, Self::notify_one(handle, event))
            })
            .collect()
    }

    pub fn notify_one(handle: &ClientHandle, event: SessionEvent) -> Delivery {
        match handle.send(event) {
            Ok(()) => Delivery::Delivered,
            Err(_) => {
                let error = AppError::DeliveryFailure {
                    identity: handle.identity,
                };
                warn!("❌ {} (endpoint {})", error, handle.endpoint);
                Delivery::Unreachable
            }
        }
    }
}
