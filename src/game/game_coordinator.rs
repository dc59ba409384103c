use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::game::choice::ChosenSet;
use crate::game::session::{GameSession, JoinOutcome, Phase, SessionEvent, TurnUpdate};
use crate::game::state_broadcaster::StateBroadcaster;
use crate::game::PlayerId;
use crate::AppResult;

/// Owns the single game session. Every operation runs under the session lock,
/// and updates are pushed to clients before the lock is released so all
/// clients observe turns in the same order.
pub struct TurnCoordinator {
    session: Mutex<GameSession>,
    turn_timeout: Option<Duration>,
}

impl TurnCoordinator {
    pub fn new(session: GameSession, turn_timeout: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
            turn_timeout,
        })
    }

    pub fn from_config(config: &ServerConfig) -> AppResult<Arc<Self>> {
        let session = GameSession::new(config.rules.clone())?;
        Ok(Self::new(session, config.turn_timeout))
    }

    pub async fn join_game(
        self: &Arc<Self>,
        endpoint: &str,
        outbound: mpsc::UnboundedSender<SessionEvent>,
    ) -> AppResult<JoinOutcome> {
        let mut session = self.session.lock().await;
        let outcome = session.join(endpoint, outbound)?;
        info!(
            "🎮 Player #{} joined ({} connected)",
            outcome.identity,
            session.registry().count()
        );

        if let Some(snapshot) = &outcome.snapshot {
            if let Some(handle) = session.registry().handle(outcome.identity) {
                StateBroadcaster::notify_one(handle, SessionEvent::Update(snapshot.clone()));
            }
        }
        Ok(outcome)
    }

    pub async fn leave_game(self: &Arc<Self>, identity: PlayerId) {
        let mut session = self.session.lock().await;
        if session.registry().position(identity).is_none() {
            debug!("Leave from unknown player #{} ignored", identity);
            return;
        }

        let configurer = session.configurer();
        let update = session.leave(identity);
        info!(
            "👋 Player #{} left ({} remaining)",
            identity,
            session.registry().count()
        );
        if let Some(update) = update {
            self.publish(&session, update);
        }

        // The player count is still open and its new owner was never asked.
        if let Some(next) = session.configurer().filter(|next| Some(*next) != configurer) {
            info!("⚙️ Player #{} now configures the game", next);
            if let Some(handle) = session.registry().handle(next) {
                StateBroadcaster::notify_one(handle, SessionEvent::ConfigureRequested);
            }
        }
    }

    pub async fn next_player_turn(
        self: &Arc<Self>,
        identity: PlayerId,
        chosen: Option<Vec<u32>>,
    ) -> AppResult<()> {
        let mut session = self.session.lock().await;
        let update = session.advance_turn(identity, chosen.map(ChosenSet::from_values))?;

        if let Some(update) = update {
            info!(
                "🔄 Turn {} done by #{}, next is #{}",
                update.turn_counter, identity, update.next_active
            );
            if update.game_over {
                info!("🏁 Game over after {} turns", update.turn_counter);
            }
            self.publish(&session, update);
        }
        Ok(())
    }

    pub async fn set_number_player_allowed(self: &Arc<Self>, count: u32) -> AppResult<()> {
        let mut session = self.session.lock().await;
        let update = session.configure(count)?;
        info!("⚙️ Game configured for {} players", count);

        if let Some(update) = update {
            self.publish(&session, update);
        }
        Ok(())
    }

    pub async fn get_number_of_players(&self) -> u32 {
        self.session.lock().await.players_allowed()
    }

    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase()
    }

    pub async fn turn_counter(&self) -> u32 {
        self.session.lock().await.turn_counter()
    }

    pub async fn active_identity(&self) -> Option<PlayerId> {
        self.session.lock().await.active_identity()
    }

    pub async fn ordered_identities(&self) -> Vec<PlayerId> {
        self.session.lock().await.registry().ordered_identities()
    }

    async fn expire_turn(self: &Arc<Self>, turn_counter: u32, identity: PlayerId) {
        let mut session = self.session.lock().await;
        if let Some(update) = session.expire_turn(turn_counter, identity) {
            warn!(
                "⏰ Player #{} timed out on turn {}, passing to #{}",
                identity, turn_counter, update.next_active
            );
            self.publish(&session, update);
        }
    }

    fn publish(self: &Arc<Self>, session: &GameSession, update: TurnUpdate) {
        StateBroadcaster::notify(session.registry(), &update);
        self.arm_turn_timer(&update);
    }

    fn arm_turn_timer(self: &Arc<Self>, update: &TurnUpdate) {
        let Some(timeout) = self.turn_timeout else {
            return;
        };
        if update.game_over {
            return;
        }

        let coordinator = Arc::clone(self);
        let (turn_counter, identity) = (update.turn_counter, update.next_active);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            coordinator.expire_turn(turn_counter, identity).await;
        });
    }
}
