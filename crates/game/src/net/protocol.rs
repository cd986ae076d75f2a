use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::event::AnimationEvent;
use crate::snapshot::GameStateSnapshot;

pub const WS_PATH: &str = "/ws";
pub const DEFAULT_PORT: u16 = 6767;

pub fn ws_url(address: &str) -> String {
    let address = address
        .trim()
        .trim_start_matches("ws://")
        .trim_end_matches('/')
        .trim_end_matches(WS_PATH);
    format!("ws://{}{}", address, WS_PATH)
}

/// Requests sent to the server. Everything past `login` carries the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Login { name: String },
    Reconnect { token: String },
    StartGame { token: String },
    PlayCard { token: String, index: usize },
    ChooseStack { token: String, index: usize },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    LoginOk {
        success: bool,
        #[serde(default)]
        token: Option<String>,
    },
    StartGame,
    Gamestate {
        state: Box<GameStateSnapshot>,
    },
    ReconnectOk {
        state: Box<GameStateSnapshot>,
    },
    Animations {
        animations: Vec<AnimationEvent>,
    },
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_use_type_discriminator() {
        let play = ClientMessage::PlayCard {
            token: String::from("t"),
            index: 1,
        };
        assert_eq!(
            play.to_json().unwrap(),
            r#"{"type":"play_card","token":"t","index":1}"#
        );

        let reconnect = ClientMessage::Reconnect {
            token: String::from("t"),
        };
        assert_eq!(
            reconnect.to_json().unwrap(),
            r#"{"type":"reconnect","token":"t"}"#
        );
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let message = ServerMessage::parse(r#"{"type":"chat","text":"hi"}"#).unwrap();
        assert_eq!(message, ServerMessage::Unknown);
    }

    #[test]
    fn test_login_and_start_parse() {
        let login = ServerMessage::parse(r#"{"type":"login_ok","success":false,"token":null}"#);
        assert!(matches!(
            login,
            Ok(ServerMessage::LoginOk {
                success: false,
                token: None
            })
        ));
        assert_eq!(
            ServerMessage::parse(r#"{"type":"start_game"}"#).unwrap(),
            ServerMessage::StartGame
        );
    }

    #[test]
    fn test_structural_failures_are_malformed() {
        for raw in [
            "not json",
            r#"{"no_type": true}"#,
            r#"{"type":"gamestate","state":{"players":"nope"}}"#,
            r#"{"type":"animations","animations":[{"action":"teleport"}]}"#,
        ] {
            assert!(
                matches!(ServerMessage::parse(raw), Err(Error::MalformedEnvelope(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_ws_url_normalizes_address() {
        assert_eq!(ws_url("10.0.0.2:6767"), "ws://10.0.0.2:6767/ws");
        assert_eq!(ws_url("ws://host:1/ws"), "ws://host:1/ws");
        assert_eq!(ws_url(" host:1/ "), "ws://host:1/ws");
    }
}
