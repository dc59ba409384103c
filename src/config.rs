use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{AppError, AppResult};

/// Largest player bound a ruleset may allow.
pub const MAX_PLAYER_LIMIT: u32 = 64;

/// Card shape, pick count and player bounds for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub rows: usize,
    pub cols: usize,
    /// Numbers each player picks (K).
    pub picks: usize,
    pub min_players: u32,
    pub max_players: u32,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            picks: 10,
            min_players: 2,
            max_players: 8,
        }
    }
}

impl Ruleset {
    pub fn max_number(&self) -> u32 {
        (self.rows * self.cols) as u32
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(AppError::InvalidRuleset {
                reason: "card must have at least one row and one column".to_string(),
            });
        }
        if self.picks > self.rows * self.cols {
            return Err(AppError::InvalidRuleset {
                reason: format!(
                    "cannot pick {} numbers from a {}x{} card",
                    self.picks, self.rows, self.cols
                ),
            });
        }
        if self.min_players < 1 || self.min_players > self.max_players {
            return Err(AppError::InvalidRuleset {
                reason: format!(
                    "player bounds [{}, {}] are empty",
                    self.min_players, self.max_players
                ),
            });
        }
        if self.max_players > MAX_PLAYER_LIMIT {
            return Err(AppError::InvalidRuleset {
                reason: format!(
                    "at most {} players are supported, got {}",
                    MAX_PLAYER_LIMIT, self.max_players
                ),
            });
        }
        Ok(())
    }

    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let rules = Self {
            rows: env_or("BINGO_CARD_ROWS", defaults.rows)?,
            cols: env_or("BINGO_CARD_COLS", defaults.cols)?,
            picks: env_or("BINGO_PICKS", defaults.picks)?,
            min_players: env_or("BINGO_MIN_PLAYERS", defaults.min_players)?,
            max_players: env_or("BINGO_MAX_PLAYERS", defaults.max_players)?,
        };
        rules.validate()?;
        Ok(rules)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub rules: Ruleset,
    pub turn_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            rules: Ruleset::default(),
            turn_timeout: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> AppResult<Self> {
        let timeout_secs: u64 = env_or("BINGO_TURN_TIMEOUT_SECS", 0)?;

        Ok(Self {
            bind_address: env::var("BINGO_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            rules: Ruleset::from_env()?,
            turn_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            server_url: env::var("BINGO_SERVER_URL")
                .unwrap_or_else(|_| "ws://127.0.0.1:8080".to_string()),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| AppError::Configuration {
        key: key.to_string(),
        reason: format!("'{}': {}", raw, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ruleset_is_valid() {
        let rules = Ruleset::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.max_number(), 25);
    }

    #[test]
    fn test_ruleset_rejects_bad_shapes() {
        let too_many_picks = Ruleset {
            picks: 10,
            rows: 3,
            cols: 3,
            ..Ruleset::default()
        };
        assert!(too_many_picks.validate().is_err());

        let empty = Ruleset {
            rows: 0,
            ..Ruleset::default()
        };
        assert!(empty.validate().is_err());

        let inverted = Ruleset {
            min_players: 5,
            max_players: 3,
            ..Ruleset::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_ruleset_caps_player_bound() {
        let at_limit = Ruleset {
            max_players: MAX_PLAYER_LIMIT,
            ..Ruleset::default()
        };
        assert!(at_limit.validate().is_ok());

        let unbounded = Ruleset {
            max_players: u32::MAX,
            ..Ruleset::default()
        };
        assert!(matches!(
            unbounded.validate(),
            Err(AppError::InvalidRuleset { .. })
        ));
    }

    #[test]
    fn test_parse_value_reports_key() {
        let parsed: AppResult<u32> = parse_value("BINGO_PICKS", "ten");
        match parsed {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "BINGO_PICKS"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(parse_value::<u32>("BINGO_PICKS", " 12 "), Ok(12));
    }
}
