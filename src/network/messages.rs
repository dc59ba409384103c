use serde::{Deserialize, Serialize};

use crate::config::Ruleset;
use crate::game::session::{SessionEvent, TurnUpdate};
use crate::game::PlayerId;
use crate::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    Ping,
    JoinGame,
    LeaveGame,
    NextPlayerTurn {
        #[serde(default)]
        chosen: Option<Vec<u32>>,
    },
    SetNumberPlayerAllowed {
        count: u32,
    },
    GetNumberOfPlayers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerResponse {
    ConnectionId {
        connection_id: String,
    },
    Pong,
    Joined {
        identity: PlayerId,
        players_allowed: u32,
        must_configure: bool,
        rules: Ruleset,
    },
    Left,
    ConfigureRequested,
    Configured {
        players_allowed: u32,
    },
    NumberOfPlayers {
        count: u32,
    },
    Update(TurnUpdate),
    Error {
        kind: String,
        message: String,
    },
}

impl From<SessionEvent> for ServerResponse {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Update(update) => ServerResponse::Update(update),
            SessionEvent::ConfigureRequested => ServerResponse::ConfigureRequested,
        }
    }
}

impl ServerResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        ServerResponse::Error {
            kind: error.variant_name().to_string(),
            message: error.user_friendly_message(),
        }
    }
}

pub fn deserialize_message(json: &str) -> AppResult<ClientMessage> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_message(message: &ClientMessage) -> AppResult<String> {
    Ok(serde_json::to_string(message)?)
}

pub fn deserialize_response(json: &str) -> AppResult<ServerResponse> {
    Ok(serde_json::from_str(json)?)
}

pub fn serialize_response(response: &ServerResponse) -> AppResult<String> {
    Ok(serde_json::to_string(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::Card;
    use crate::game::choice::ChosenSet;

    #[test]
    fn test_client_message_format() {
        assert_eq!(serialize_message(&ClientMessage::JoinGame).unwrap(), "\"JoinGame\"");
        assert_eq!(
            deserialize_message(r#"{"SetNumberPlayerAllowed":{"count":3}}"#).unwrap(),
            ClientMessage::SetNumberPlayerAllowed { count: 3 }
        );
        assert_eq!(
            deserialize_message(r#"{"NextPlayerTurn":{"chosen":[4,5]}}"#).unwrap(),
            ClientMessage::NextPlayerTurn {
                chosen: Some(vec![4, 5])
            }
        );
        assert_eq!(
            deserialize_message(r#"{"NextPlayerTurn":{}}"#).unwrap(),
            ClientMessage::NextPlayerTurn { chosen: None }
        );
    }

    #[test]
    fn test_unknown_message_is_serialization_error() {
        assert!(matches!(
            deserialize_message(r#"{"Shuffle":{}}"#),
            Err(AppError::SerializationError { .. })
        ));
    }

    #[test]
    fn test_update_carries_card_rows() {
        let update = TurnUpdate {
            card: Some(Card::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap()),
            chosen: ChosenSet::from_values(vec![2]),
            turn_counter: 3,
            next_active: 1,
            game_over: true,
            results: Vec::new(),
        };
        let json = serialize_response(&ServerResponse::Update(update.clone())).unwrap();
        assert!(json.contains(r#""card":[[1,2],[3,4]]"#));
        assert!(json.contains(r#""chosen":[2]"#));

        assert_eq!(
            deserialize_response(&json).unwrap(),
            ServerResponse::Update(update)
        );
    }

    #[test]
    fn test_joined_carries_rules() {
        let rules = Ruleset {
            picks: 5,
            ..Ruleset::default()
        };
        let json = serialize_response(&ServerResponse::Joined {
            identity: 1,
            players_allowed: 0,
            must_configure: true,
            rules: rules.clone(),
        })
        .unwrap();
        assert!(json.contains(r#""picks":5"#));

        match deserialize_response(&json).unwrap() {
            ServerResponse::Joined { rules: parsed, .. } => assert_eq!(parsed, rules),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_session_events_map_to_responses() {
        assert_eq!(
            ServerResponse::from(SessionEvent::ConfigureRequested),
            ServerResponse::ConfigureRequested
        );
        assert_eq!(
            serialize_response(&ServerResponse::ConfigureRequested).unwrap(),
            "\"ConfigureRequested\""
        );
    }

    #[test]
    fn test_error_response_from_app_error() {
        let response = ServerResponse::from_app_error(&AppError::NotPlayerTurn { identity: 2 });
        assert_eq!(
            response,
            ServerResponse::Error {
                kind: "NotPlayerTurn".to_string(),
                message: "Please wait for your turn".to_string(),
            }
        );
    }
}
