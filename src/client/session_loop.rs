use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Ruleset;
use crate::errors::validation::validate_player_count;
use crate::game::card::{Card, WinPattern};
use crate::game::choice::ChosenSet;
use crate::game::session::PlayerResult;
use crate::game::PlayerId;
use crate::network::messages::{ClientMessage, ServerResponse};
use crate::{AppError, AppResult};

/// Whatever carries client requests to the coordinator.
#[async_trait]
pub trait CoordinatorLink: Send + Sync {
    async fn send(&self, message: ClientMessage) -> AppResult<()>;
}

/// The human side of the game: prompts, acknowledgements and rendering.
#[async_trait]
pub trait PlayerConsole: Send {
    async fn choose_player_count(&mut self, rules: &Ruleset) -> AppResult<u32>;
    async fn choose_numbers(&mut self, rules: &Ruleset) -> AppResult<ChosenSet>;
    async fn acknowledge(&mut self) -> AppResult<()>;
    fn show_welcome(&mut self, identity: PlayerId, players_allowed: u32);
    fn show_active(&mut self, view: &ClientView);
    fn show_choice(&mut self, chosen: &ChosenSet);
    fn show_game_over(&mut self, view: &ClientView);
}

/// The latest coordinator state as seen by one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientView {
    pub identity: Option<PlayerId>,
    /// The coordinator's rules, known once joined.
    pub rules: Option<Ruleset>,
    pub players_allowed: u32,
    pub must_configure: bool,
    pub active: Option<PlayerId>,
    pub turn_counter: u32,
    pub last_chosen: ChosenSet,
    pub game_over: bool,
    pub card: Option<Card>,
    pub results: Vec<PlayerResult>,
    pub last_error: Option<String>,
    pub rejections: u32,
    pub disconnected: bool,
}

impl ClientView {
    pub fn is_my_turn(&self) -> bool {
        !self.game_over && self.identity.is_some() && self.active == self.identity
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub identity: PlayerId,
    pub card: Option<Card>,
    pub own_pattern: Option<WinPattern>,
    pub results: Vec<PlayerResult>,
}

/// Feeds coordinator responses into the shared view that the session loop waits on.
#[derive(Debug)]
pub struct ClientSession {
    view: watch::Sender<ClientView>,
}

impl ClientSession {
    pub fn new() -> (Self, watch::Receiver<ClientView>) {
        let (view, receiver) = watch::channel(ClientView::default());
        (Self { view }, receiver)
    }

    pub fn apply(&self, response: ServerResponse) {
        self.view.send_modify(|view| match response {
            ServerResponse::Joined {
                identity,
                players_allowed,
                must_configure,
                rules,
            } => {
                view.identity = Some(identity);
                view.rules = Some(rules);
                view.players_allowed = players_allowed;
                // A configure request pushed meanwhile must not be lost.
                view.must_configure |= must_configure;
            }
            ServerResponse::ConfigureRequested => view.must_configure = true,
            ServerResponse::Configured { players_allowed }
            | ServerResponse::NumberOfPlayers {
                count: players_allowed,
            } => {
                view.players_allowed = players_allowed;
                view.must_configure = false;
            }
            ServerResponse::Update(update) => {
                view.active = Some(update.next_active);
                view.turn_counter = update.turn_counter;
                view.last_chosen = update.chosen;
                view.game_over |= update.game_over;
                if update.card.is_some() {
                    view.card = update.card;
                }
                if !update.results.is_empty() {
                    view.results = update.results;
                }
            }
            ServerResponse::Error { kind, message } => {
                warn!("Coordinator rejected request ({}): {}", kind, message);
                if kind == "AlreadyConfigured" {
                    view.must_configure = false;
                }
                view.last_error = Some(message);
                view.rejections += 1;
            }
            ServerResponse::Left => view.identity = None,
            ServerResponse::ConnectionId { .. } | ServerResponse::Pong => {}
        });
    }

    pub fn close(&self) {
        self.view.send_modify(|view| view.disconnected = true);
    }
}

async fn wait_until<F>(view: &mut watch::Receiver<ClientView>, ready: F) -> AppResult<ClientView>
where
    F: Fn(&ClientView) -> bool,
{
    let snapshot = view
        .wait_for(|v| v.disconnected || ready(v))
        .await
        .map_err(|_| AppError::ConnectionClosed)?
        .clone();
    if snapshot.disconnected && !ready(&snapshot) {
        return Err(AppError::ConnectionClosed);
    }
    Ok(snapshot)
}

/// A turn this client ended, until the coordinator accepts or rejects it.
struct PendingTurn {
    turn_counter: u32,
    rejections: u32,
    chosen: Option<ChosenSet>,
}

impl PendingTurn {
    fn settled(&self, view: &ClientView) -> bool {
        view.turn_counter != self.turn_counter || view.rejections > self.rejections
    }

    fn rejected(&self, view: &ClientView) -> bool {
        view.rejections > self.rejections
    }
}

/// Joins, configures the game whenever asked to, then takes a turn whenever
/// this client is named active until the coordinator reports game over.
/// Prompts follow the coordinator's rules as reported on join.
pub async fn run_client<L, C>(
    link: &L,
    mut view: watch::Receiver<ClientView>,
    console: &mut C,
) -> AppResult<GameOutcome>
where
    L: CoordinatorLink + ?Sized,
    C: PlayerConsole + ?Sized,
{
    link.send(ClientMessage::JoinGame).await?;
    let joined = wait_until(&mut view, |v| v.identity.is_some()).await?;
    let Some(identity) = joined.identity else {
        return Err(AppError::ConnectionClosed);
    };
    let rules = joined.rules.clone().unwrap_or_default();
    console.show_welcome(identity, joined.players_allowed);

    let mut own_choice: Option<ChosenSet> = None;
    let mut pending: Option<PendingTurn> = None;

    loop {
        let current = wait_until(&mut view, |v| {
            v.game_over
                || v.must_configure
                || (v.is_my_turn() && pending.as_ref().map_or(true, |turn| turn.settled(v)))
        })
        .await?;

        if let Some(turn) = pending.take() {
            if turn.rejected(&current) {
                warn!(
                    "Turn {} was not accepted: {}",
                    turn.turn_counter,
                    current.last_error.as_deref().unwrap_or("unknown reason")
                );
            } else if turn.chosen.is_some() {
                own_choice = turn.chosen;
            }
        }

        if current.game_over {
            console.show_game_over(&current);
            let own_pattern = match (&current.card, &own_choice) {
                (Some(card), Some(chosen)) => card.evaluate(chosen),
                _ => None,
            };
            let _ = link.send(ClientMessage::LeaveGame).await;
            info!("🏁 Game over for player #{}", identity);

            return Ok(GameOutcome {
                identity,
                card: current.card,
                own_pattern,
                results: current.results,
            });
        }

        if current.must_configure {
            configure(link, &mut view, console, &rules).await?;
            continue;
        }

        console.show_active(&current);
        let chosen = match &own_choice {
            Some(_) => None,
            None => {
                let chosen = console.choose_numbers(&rules).await?;
                console.show_choice(&chosen);
                Some(chosen)
            }
        };

        console.acknowledge().await?;
        debug!("Player #{} ends turn {}", identity, current.turn_counter);
        let rejections = view.borrow().rejections;
        link.send(ClientMessage::NextPlayerTurn {
            chosen: chosen.as_ref().map(|c| c.values().to_vec()),
        })
        .await?;

        pending = Some(PendingTurn {
            turn_counter: current.turn_counter,
            rejections,
            chosen,
        });
    }
}

async fn configure<L, C>(
    link: &L,
    view: &mut watch::Receiver<ClientView>,
    console: &mut C,
    rules: &Ruleset,
) -> AppResult<()>
where
    L: CoordinatorLink + ?Sized,
    C: PlayerConsole + ?Sized,
{
    loop {
        let count = console.choose_player_count(rules).await?;
        if let Err(e) = validate_player_count(count, rules) {
            warn!("{}", e.user_friendly_message());
            continue;
        }

        let rejections = view.borrow().rejections;
        link.send(ClientMessage::SetNumberPlayerAllowed { count })
            .await?;
        let answered =
            wait_until(view, |v| !v.must_configure || v.rejections > rejections).await?;
        if !answered.must_configure {
            return Ok(());
        }
    }
}
