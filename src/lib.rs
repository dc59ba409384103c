pub mod client;
pub mod config;
pub mod errors;
pub mod game;
pub mod network;

// Re-export commonly used items for convenience
pub use config::{ClientConfig, Ruleset, ServerConfig};
pub use errors::{AppError, AppResult, ErrorCategory};
pub use game::card::{Card, WinPattern};
pub use game::choice::ChosenSet;
pub use game::game_coordinator::TurnCoordinator;
pub use game::session::{GameSession, Phase, TurnUpdate};
pub use network::websocket::WebsocketServer;
