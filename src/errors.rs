use serde::Serialize;
use thiserror::Error;

use crate::game::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum AppError {
    // Configuration errors
    #[error("Player count {count} is outside the allowed range [{min}, {max}]")]
    InvalidPlayerCount { count: u32, min: u32, max: u32 },

    #[error("Number of players is already configured ({players_allowed})")]
    AlreadyConfigured { players_allowed: u32 },

    #[error("Invalid ruleset: {reason}")]
    InvalidRuleset { reason: String },

    #[error("Invalid value for '{key}': {reason}")]
    Configuration { key: String, reason: String },

    // Session errors
    #[error("Player #{identity} is not registered")]
    UnknownIdentity { identity: PlayerId },

    #[error("Failed to deliver update to player #{identity}")]
    DeliveryFailure { identity: PlayerId },

    #[error("Connection is not registered in the game")]
    NotJoined,

    // Game errors
    #[error("Invalid choice: {reason}")]
    MalformedChoice { reason: String },

    #[error("Player #{identity} already submitted a choice")]
    ChoiceAlreadySubmitted { identity: PlayerId },

    #[error("Not player #{identity}'s turn")]
    NotPlayerTurn { identity: PlayerId },

    #[error("Number of players has not been configured yet")]
    GameNotConfigured,

    #[error("Game is over")]
    GameOver,

    #[error("Invalid card: {reason}")]
    InvalidCard { reason: String },

    // Transport errors
    #[error("Failed to serialize message: {message}")]
    SerializationError { message: String },

    #[error("WebSocket error: {message}")]
    WebSocketError { message: String },

    #[error("Connection to the coordinator closed")]
    ConnectionClosed,

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ClientError,
    ServerError,
    ValidationError,
    GameError,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::UnknownIdentity { .. }
            | AppError::NotJoined
            | AppError::AlreadyConfigured { .. } => ErrorCategory::ClientError,

            AppError::InvalidPlayerCount { .. }
            | AppError::MalformedChoice { .. }
            | AppError::InvalidRuleset { .. }
            | AppError::InvalidCard { .. }
            | AppError::Configuration { .. } => ErrorCategory::ValidationError,

            AppError::DeliveryFailure { .. }
            | AppError::SerializationError { .. }
            | AppError::WebSocketError { .. }
            | AppError::ConnectionClosed
            | AppError::Internal { .. } => ErrorCategory::ServerError,

            AppError::ChoiceAlreadySubmitted { .. }
            | AppError::NotPlayerTurn { .. }
            | AppError::GameNotConfigured
            | AppError::GameOver => ErrorCategory::GameError,
        }
    }

    pub fn should_log(&self) -> bool {
        matches!(self.category(), ErrorCategory::ServerError)
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            AppError::InvalidPlayerCount { .. } => "InvalidPlayerCount",
            AppError::AlreadyConfigured { .. } => "AlreadyConfigured",
            AppError::InvalidRuleset { .. } => "InvalidRuleset",
            AppError::Configuration { .. } => "Configuration",
            AppError::UnknownIdentity { .. } => "UnknownIdentity",
            AppError::DeliveryFailure { .. } => "DeliveryFailure",
            AppError::NotJoined => "NotJoined",
            AppError::MalformedChoice { .. } => "MalformedChoice",
            AppError::ChoiceAlreadySubmitted { .. } => "ChoiceAlreadySubmitted",
            AppError::NotPlayerTurn { .. } => "NotPlayerTurn",
            AppError::GameNotConfigured => "GameNotConfigured",
            AppError::GameOver => "GameOver",
            AppError::InvalidCard { .. } => "InvalidCard",
            AppError::SerializationError { .. } => "SerializationError",
            AppError::WebSocketError { .. } => "WebSocketError",
            AppError::ConnectionClosed => "ConnectionClosed",
            AppError::Internal { .. } => "Internal",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::InvalidPlayerCount { min, max, .. } => {
                format!("Must choose between {} and {} players", min, max)
            }
            AppError::NotPlayerTurn { .. } => "Please wait for your turn".to_string(),
            AppError::GameOver => "The game is already over".to_string(),
            AppError::SerializationError { .. } => "Invalid message format".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        AppError::WebSocketError {
            message: err.to_string(),
        }
    }
}

pub mod validation {
    use std::collections::HashSet;

    use super::{AppError, AppResult};
    use crate::config::Ruleset;

    pub fn validate_player_count(count: u32, rules: &Ruleset) -> AppResult<()> {
        if count < rules.min_players || count > rules.max_players {
            return Err(AppError::InvalidPlayerCount {
                count,
                min: rules.min_players,
                max: rules.max_players,
            });
        }
        Ok(())
    }

    pub fn validate_chosen_numbers(numbers: &[u32], rules: &Ruleset) -> AppResult<()> {
        if numbers.len() > rules.picks {
            return Err(AppError::MalformedChoice {
                reason: format!("at most {} numbers may be chosen", rules.picks),
            });
        }
        let max = rules.max_number();
        let mut seen = HashSet::with_capacity(numbers.len());
        for &number in numbers {
            if number < 1 || number > max {
                return Err(AppError::MalformedChoice {
                    reason: format!("{} is not between 1 and {}", number, max),
                });
            }
            if !seen.insert(number) {
                return Err(AppError::MalformedChoice {
                    reason: format!("{} was chosen more than once", number),
                });
            }
        }
        Ok(())
    }
}
