use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::card::{Card, sum_points};
use crate::error::Error;

/// Connection-scoped player identifier, as issued by the server.
pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub points: i64,
    #[serde(default)]
    pub card_points: Vec<Card>,
    #[serde(default)]
    pub played_card: Option<Card>,
    /// Only present for the local player.
    #[serde(default)]
    pub hand: Vec<Card>,
}

impl PlayerView {
    pub fn total(&self) -> i64 {
        self.points + sum_points(&self.card_points)
    }
}

/// One authoritative description of the table, as seen by `self_conn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub players: Vec<PlayerId>,
    pub self_conn: PlayerId,
    #[serde(default)]
    pub waiting_for_stack: Option<PlayerId>,
    #[serde(default)]
    pub waiting_for_card: Vec<PlayerId>,
    pub stacks: Vec<Vec<Card>>,
    #[serde(rename = "self")]
    pub own: PlayerView,
    #[serde(default)]
    pub others: HashMap<PlayerId, PlayerView>,
}

impl GameStateSnapshot {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.players.contains(&self.self_conn) {
            return Err(Error::InvalidSnapshot(format!(
                "self_conn {} is not among the players",
                self.self_conn
            )));
        }
        if let Some(waiting) = &self.waiting_for_stack {
            if !self.players.contains(waiting) {
                return Err(Error::InvalidSnapshot(format!(
                    "waiting_for_stack names unknown player {}",
                    waiting
                )));
            }
        }
        Ok(())
    }

    pub fn awaiting_stack_choice(&self) -> bool {
        self.waiting_for_stack.is_some()
    }

    /// Every entry of `others`: seated opponents in seating order, then any
    /// without a seat, ordered by id.
    pub fn opponents(&self) -> Vec<(&PlayerId, &PlayerView)> {
        let mut opponents: Vec<_> = self
            .players
            .iter()
            .filter(|p| **p != self.self_conn)
            .filter_map(|p| self.others.get_key_value(p))
            .collect();

        let mut unseated: Vec<_> = self
            .others
            .iter()
            .filter(|(p, _)| !self.players.contains(*p))
            .collect();
        if !unseated.is_empty() {
            log::debug!("{} opponents have no seat", unseated.len());
            unseated.sort_by(|a, b| a.0.cmp(b.0));
            opponents.extend(unseated);
        }
        opponents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "players": ["a", "b"],
        "self_conn": "a",
        "waiting_for_stack": null,
        "waiting_for_card": ["b"],
        "stacks": [[{"face": 3, "value": 1}], [{"face": 55, "value": 7}]],
        "self": {
            "name": "Ann", "points": 4, "card_points": [{"face": 10, "value": 3}],
            "played_card": null, "hand": [{"face": 5, "value": 2}]
        },
        "others": {
            "b": {"name": "Bob", "points": 0, "card_points": [], "played_card": {"face": "?", "value": "?"}}
        }
    }"#;

    #[test]
    fn test_parses_server_snapshot() {
        let snapshot: GameStateSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.own.total(), 7);
        assert!(!snapshot.awaiting_stack_choice());
        assert_eq!(snapshot.others["b"].played_card, Some(Card::hidden()));
        assert_eq!(snapshot.opponents().len(), 1);
    }

    #[test]
    fn test_unseated_opponents_follow_seated_ones() {
        let mut snapshot: GameStateSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let bob = snapshot.others["b"].clone();
        snapshot.others.insert(String::from("z"), bob.clone());
        snapshot.others.insert(String::from("y"), bob);

        let ids: Vec<_> = snapshot.opponents().into_iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(ids, vec!["b", "y", "z"]);
    }

    #[test]
    fn test_rejects_self_outside_players() {
        let mut snapshot: GameStateSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        snapshot.self_conn = String::from("z");
        assert!(matches!(snapshot.validate(), Err(Error::InvalidSnapshot(_))));
    }
}
