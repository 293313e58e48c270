//! Deck is a named, ordered set of cards
use super::Card;
use super::card::new_id;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_lookup_by_id() {
        let mut deck = Deck::new("Biology");
        let card = Card::new("cell", "unit of life", 0);
        let id = card.id.clone();
        deck.cards.push(card);

        assert_eq!(deck.card(&id).map(|c| c.front.as_str()), Some("cell"));
        assert!(deck.card("missing").is_none());

        deck.card_mut(&id).unwrap().interval = 4;
        assert_eq!(deck.cards[0].interval, 4);
    }

    #[test]
    fn test_deck_json_shape() {
        let deck: Deck = serde_json::from_str(
            r#"{"id": "d1", "name": "Polish", "cards": [{"id": "c1", "front": "tak", "back": "yes", "dueDate": 5, "interval": 1, "ease": 2.2}]}"#,
        )
        .unwrap();

        assert_eq!(deck.id, "d1");
        assert_eq!(deck.cards.len(), 1);
        assert_eq!(deck.cards[0].due_date, 5);
        assert_eq!(deck.cards[0].ease, 2.2);
    }
}
