#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};

use num_bingo::client::{ClientSession, ClientView, CoordinatorLink, PlayerConsole};
use num_bingo::game::PlayerId;
use num_bingo::network::messages::{ClientMessage, ServerResponse};
use num_bingo::network::websocket::MessageHandler;
use num_bingo::{AppResult, Card, ChosenSet, GameSession, Ruleset, TurnCoordinator};

/// 5x5 card holding 1..=25 in reading order.
pub fn ordered_card() -> Card {
    Card::from_rows((0..5).map(|r| (1..=5).map(|c| r * 5 + c).collect()).collect()).unwrap()
}

pub fn coordinator_with_ordered_card() -> Arc<TurnCoordinator> {
    coordinator_with_rules(Ruleset::default())
}

pub fn coordinator_with_rules(rules: Ruleset) -> Arc<TurnCoordinator> {
    TurnCoordinator::new(GameSession::with_card(rules, ordered_card()), None)
}

/// Talks to the coordinator in-process through a `MessageHandler`.
pub struct LocalLink {
    handler: Mutex<MessageHandler>,
    session: Arc<ClientSession>,
}

impl LocalLink {
    pub fn new(connection_id: &str, coordinator: Arc<TurnCoordinator>, session: ClientSession) -> Self {
        let (update_sender, mut update_receiver) = mpsc::unbounded_channel();
        let session = Arc::new(session);

        let forward = session.clone();
        tokio::spawn(async move {
            while let Some(event) = update_receiver.recv().await {
                forward.apply(ServerResponse::from(event));
            }
        });

        Self {
            handler: Mutex::new(MessageHandler::new(
                connection_id.to_string(),
                coordinator,
                update_sender,
            )),
            session,
        }
    }
}

#[async_trait]
impl CoordinatorLink for LocalLink {
    async fn send(&self, message: ClientMessage) -> AppResult<()> {
        let response = self.handler.lock().await.handle(message).await;
        if let Some(response) = response {
            self.session.apply(response);
        }
        Ok(())
    }
}

/// Console that answers every prompt from a script.
pub struct ScriptedConsole {
    pub player_count: u32,
    pub numbers: Vec<u32>,
    /// Sent unchecked on the first prompt, before `numbers`.
    pub first_attempt: Option<Vec<u32>>,
    pub configure_gate: Option<Arc<Notify>>,
    pub seen_picks: Option<usize>,
    pub configure_prompts: u32,
    pub number_prompts: u32,
    pub turns_taken: u32,
    pub game_over: Option<ClientView>,
}

impl ScriptedConsole {
    pub fn new(player_count: u32, numbers: &[u32]) -> Self {
        Self {
            player_count,
            numbers: numbers.to_vec(),
            first_attempt: None,
            configure_gate: None,
            seen_picks: None,
            configure_prompts: 0,
            number_prompts: 0,
            turns_taken: 0,
            game_over: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.configure_gate = Some(gate);
        self
    }

    pub fn first_trying(mut self, numbers: &[u32]) -> Self {
        self.first_attempt = Some(numbers.to_vec());
        self
    }
}

#[async_trait]
impl PlayerConsole for ScriptedConsole {
    async fn choose_player_count(&mut self, _rules: &Ruleset) -> AppResult<u32> {
        if let Some(gate) = &self.configure_gate {
            gate.notified().await;
        }
        self.configure_prompts += 1;
        Ok(self.player_count)
    }

    async fn choose_numbers(&mut self, rules: &Ruleset) -> AppResult<ChosenSet> {
        self.number_prompts += 1;
        self.seen_picks = Some(rules.picks);
        if let Some(attempt) = self.first_attempt.take() {
            return Ok(ChosenSet::from_values(attempt));
        }
        ChosenSet::new(self.numbers.clone(), rules)
    }

    async fn acknowledge(&mut self) -> AppResult<()> {
        self.turns_taken += 1;
        Ok(())
    }

    fn show_welcome(&mut self, _identity: PlayerId, _players_allowed: u32) {}

    fn show_active(&mut self, _view: &ClientView) {}

    fn show_choice(&mut self, _chosen: &ChosenSet) {}

    fn show_game_over(&mut self, view: &ClientView) {
        self.game_over = Some(view.clone());
    }
}

/// Polls until the coordinator has `count` registered players.
pub async fn wait_for_players(coordinator: &TurnCoordinator, count: usize) {
    while coordinator.ordered_identities().await.len() < count {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
