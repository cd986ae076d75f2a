use serde::{Deserialize, Serialize};

/// One printed number on a card. Opponents' unrevealed cards carry `"?"`
/// instead of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawPip", into = "RawPip")]
pub enum Pip {
    Known(i64),
    Hidden,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPip {
    Number(i64),
    Text(String),
}

impl From<RawPip> for Pip {
    fn from(raw: RawPip) -> Self {
        match raw {
            RawPip::Number(n) => Pip::Known(n),
            RawPip::Text(text) => text.trim().parse().map(Pip::Known).unwrap_or(Pip::Hidden),
        }
    }
}

impl From<Pip> for RawPip {
    fn from(pip: Pip) -> Self {
        match pip {
            Pip::Known(n) => RawPip::Number(n),
            Pip::Hidden => RawPip::Text(String::from("?")),
        }
    }
}

impl Pip {
    pub fn known(&self) -> Option<i64> {
        match self {
            Pip::Known(n) => Some(*n),
            Pip::Hidden => None,
        }
    }
}

impl std::fmt::Display for Pip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pip::Known(n) => write!(f, "{}", n),
            Pip::Hidden => write!(f, "?"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub face: Pip,
    pub value: Pip,
}

impl Card {
    pub fn new(face: i64, value: i64) -> Self {
        Self {
            face: Pip::Known(face),
            value: Pip::Known(value),
        }
    }

    pub fn hidden() -> Self {
        Self {
            face: Pip::Hidden,
            value: Pip::Hidden,
        }
    }

    pub fn points(&self) -> i64 {
        self.value.known().unwrap_or(0)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.face, self.value)
    }
}

pub fn sum_points(cards: &[Card]) -> i64 {
    cards.iter().map(Card::points).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_card_parses_from_question_marks() {
        let card: Card = serde_json::from_str(r#"{"face":"?","value":"?"}"#).unwrap();
        assert_eq!(card, Card::hidden());
        assert_eq!(card.points(), 0);
        assert_eq!(serde_json::to_string(&card).unwrap(), r#"{"face":"?","value":"?"}"#);
    }

    #[test]
    fn test_known_faces_sort_before_hidden() {
        let mut pips = vec![Pip::Hidden, Pip::Known(55), Pip::Known(3)];
        pips.sort();
        assert_eq!(pips, vec![Pip::Known(3), Pip::Known(55), Pip::Hidden]);
    }

    #[test]
    fn test_card_points_sum_known_values() {
        let cards = [Card::new(55, 7), Card::new(10, 3), Card::hidden()];
        assert_eq!(sum_points(&cards), 10);
    }
}
