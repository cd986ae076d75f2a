use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::{Card, PlayerId};

/// A server-announced visual transition. Consumed once, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AnimationEvent {
    PlayCard {
        player: PlayerId,
        stack: usize,
    },
    PickStack {
        player: PlayerId,
        stack: usize,
    },
    RevealCards {
        #[serde(alias = "revealed")]
        revealed_cards: HashMap<PlayerId, Card>,
    },
}

impl AnimationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlayCard { .. } => "play_card",
            Self::PickStack { .. } => "pick_stack",
            Self::RevealCards { .. } => "reveal_cards",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_action_tagged_events() {
        let events: Vec<AnimationEvent> = serde_json::from_str(
            r#"[
                {"action": "reveal_cards", "revealed_cards": {"p1": {"face": 7, "value": 1}}},
                {"action": "pick_stack", "stack": 2, "player": "p1"},
                {"action": "play_card", "stack": 2, "player": "p1"}
            ]"#,
        )
        .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind(), "reveal_cards");
        assert_eq!(
            events[2],
            AnimationEvent::PlayCard {
                player: String::from("p1"),
                stack: 2
            }
        );
    }

    #[test]
    fn test_accepts_short_reveal_key() {
        let event: AnimationEvent =
            serde_json::from_str(r#"{"action": "reveal_cards", "revealed": {}}"#).unwrap();
        assert!(matches!(event, AnimationEvent::RevealCards { revealed_cards } if revealed_cards.is_empty()));
    }
}
