use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::config::Ruleset;
use crate::errors::validation::{validate_chosen_numbers, validate_player_count};
use crate::game::card::{Card, WinPattern};
use crate::game::choice::ChosenSet;
use crate::game::registry::SessionRegistry;
use crate::game::PlayerId;
use crate::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingPlayerCountConfiguration,
    InProgress,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub identity: PlayerId,
    pub chosen: ChosenSet,
    pub pattern: Option<WinPattern>,
}

/// What every client hears after a turn changes hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnUpdate {
    /// Only present once the game is over.
    pub card: Option<Card>,
    /// The set submitted by the player who just moved, if any.
    pub chosen: ChosenSet,
    pub turn_counter: u32,
    pub next_active: PlayerId,
    pub game_over: bool,
    /// Every recorded choice evaluated against the card, at game over.
    pub results: Vec<PlayerResult>,
}

/// Pushed to a client outside of any request it made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Update(TurnUpdate),
    /// The receiver now holds registry position 0 of an unconfigured game.
    ConfigureRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub identity: PlayerId,
    pub players_allowed: u32,
    pub must_configure: bool,
    pub rules: Ruleset,
    /// Current turn state for a client joining a game already under way.
    pub snapshot: Option<TurnUpdate>,
}

/// All shared state of one game. Callers serialize access (see `TurnCoordinator`).
#[derive(Debug)]
pub struct GameSession {
    rules: Ruleset,
    card: Card,
    registry: SessionRegistry,
    turn_index: usize,
    turn_counter: u32,
    players_allowed: u32,
    phase: Phase,
    choices: Vec<(PlayerId, ChosenSet)>,
}

impl GameSession {
    pub fn new(rules: Ruleset) -> AppResult<Self> {
        let card = Card::generate(rules.rows, rules.cols)?;
        Ok(Self::with_card(rules, card))
    }

    pub fn with_card(rules: Ruleset, card: Card) -> Self {
        Self {
            rules,
            card,
            registry: SessionRegistry::new(),
            turn_index: 0,
            turn_counter: 0,
            players_allowed: 0,
            phase: Phase::AwaitingPlayerCountConfiguration,
            choices: Vec::new(),
        }
    }

    pub fn join(
        &mut self,
        endpoint: &str,
        outbound: mpsc::UnboundedSender<SessionEvent>,
    ) -> AppResult<JoinOutcome> {
        if self.phase == Phase::GameOver && self.registry.identity_of(endpoint).is_none() {
            return Err(AppError::GameOver);
        }

        let (identity, _) = self.registry.register(endpoint, outbound);
        let must_configure = self.phase == Phase::AwaitingPlayerCountConfiguration
            && self.registry.position(identity) == Some(0);
        let snapshot = match self.phase {
            Phase::InProgress => Some(self.current_update(ChosenSet::default())),
            _ => None,
        };

        Ok(JoinOutcome {
            identity,
            players_allowed: self.players_allowed,
            must_configure,
            rules: self.rules.clone(),
            snapshot,
        })
    }

    /// Sets the player bound and opens the first turn.
    pub fn configure(&mut self, count: u32) -> AppResult<Option<TurnUpdate>> {
        if self.phase != Phase::AwaitingPlayerCountConfiguration {
            return Err(AppError::AlreadyConfigured {
                players_allowed: self.players_allowed,
            });
        }
        validate_player_count(count, &self.rules)?;

        self.players_allowed = count;
        self.phase = Phase::InProgress;

        if self.registry.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.current_update(ChosenSet::default())))
    }

    /// Ends `caller`'s turn. Only the active identity may advance; once the
    /// game is over this is a no-op.
    pub fn advance_turn(
        &mut self,
        caller: PlayerId,
        chosen: Option<ChosenSet>,
    ) -> AppResult<Option<TurnUpdate>> {
        match self.phase {
            Phase::AwaitingPlayerCountConfiguration => return Err(AppError::GameNotConfigured),
            Phase::GameOver => return Ok(None),
            Phase::InProgress => {}
        }

        if self.registry.position(caller).is_none() {
            return Err(AppError::UnknownIdentity { identity: caller });
        }
        if self.active_identity() != Some(caller) {
            return Err(AppError::NotPlayerTurn { identity: caller });
        }

        // An empty set counts as no submission.
        let chosen = match chosen.filter(|chosen| !chosen.is_empty()) {
            Some(chosen) => {
                validate_chosen_numbers(chosen.values(), &self.rules)?;
                if self.choice_of(caller).is_some() {
                    return Err(AppError::ChoiceAlreadySubmitted { identity: caller });
                }
                self.choices.push((caller, chosen.clone()));
                chosen
            }
            None => ChosenSet::default(),
        };

        Ok(Some(self.advance(chosen)))
    }

    /// Advances on behalf of an idle player if the turn identified by
    /// `turn_counter` and `identity` is still pending.
    pub fn expire_turn(&mut self, turn_counter: u32, identity: PlayerId) -> Option<TurnUpdate> {
        let pending = self.phase == Phase::InProgress
            && self.turn_counter == turn_counter
            && self.active_identity() == Some(identity);
        pending.then(|| self.advance(ChosenSet::default()))
    }

    /// Removes `identity` and repairs the turn index so nobody is skipped or
    /// visited twice. Returns an update when the departing client held the turn.
    pub fn leave(&mut self, identity: PlayerId) -> Option<TurnUpdate> {
        let position = self.registry.unregister(identity)?;

        if self.registry.is_empty() {
            self.turn_index = 0;
            return None;
        }

        if position < self.turn_index {
            self.turn_index -= 1;
            None
        } else if position == self.turn_index {
            // The next client slid into this position.
            self.turn_index %= self.registry.count();
            (self.phase == Phase::InProgress).then(|| self.current_update(ChosenSet::default()))
        } else {
            None
        }
    }

    fn advance(&mut self, chosen: ChosenSet) -> TurnUpdate {
        self.turn_counter += 1;
        self.turn_index = (self.turn_index + 1) % self.registry.count();
        if self.turn_counter > self.players_allowed {
            self.phase = Phase::GameOver;
        }
        self.current_update(chosen)
    }

    fn current_update(&self, chosen: ChosenSet) -> TurnUpdate {
        let game_over = self.is_game_over();
        TurnUpdate {
            card: game_over.then(|| self.card.clone()),
            chosen,
            turn_counter: self.turn_counter,
            next_active: self.active_identity().unwrap_or_default(),
            game_over,
            results: if game_over { self.results() } else { Vec::new() },
        }
    }

    pub fn results(&self) -> Vec<PlayerResult> {
        self.choices
            .iter()
            .map(|(identity, chosen)| PlayerResult {
                identity: *identity,
                chosen: chosen.clone(),
                pattern: self.card.evaluate(chosen),
            })
            .collect()
    }

    /// Who is expected to pick the player count, while nobody has yet.
    pub fn configurer(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::AwaitingPlayerCountConfiguration => self.registry.get(0).map(|h| h.identity),
            _ => None,
        }
    }

    pub fn active_identity(&self) -> Option<PlayerId> {
        self.registry
            .get(self.turn_index)
            .map(|handle| handle.identity)
    }

    pub fn choice_of(&self, identity: PlayerId) -> Option<&ChosenSet> {
        self.choices
            .iter()
            .find(|(id, _)| *id == identity)
            .map(|(_, chosen)| chosen)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn turn_counter(&self) -> u32 {
        self.turn_counter
    }

    pub fn players_allowed(&self) -> u32 {
        self.players_allowed
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}
