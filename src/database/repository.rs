//! Collaborator contracts consumed by the review core.
//!
//! Decks are stored as one collection: every change reads all decks, edits
//! them in memory and writes the whole collection back. There is no finer
//! grained update, and nothing guards against two writers racing.

use crate::error::{Result, ReviewError, StorageError};
use crate::models::{Achievement, Card, Deck};
use log::info;

pub trait DeckRepository {
    fn get_decks(&self) -> std::result::Result<Vec<Deck>, StorageError>;

    /// Replaces the whole collection.
    fn save_decks(&self, decks: &[Deck]) -> std::result::Result<(), StorageError>;

    fn find_deck(&self, deck_id: &str) -> Result<Deck> {
        self.get_decks()?
            .into_iter()
            .find(|d| d.id == deck_id)
            .ok_or_else(|| ReviewError::DeckNotFound(deck_id.to_string()))
    }

    fn create_deck(&self, name: &str) -> Result<Deck> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReviewError::InvalidInput("deck name is empty".to_string()));
        }

        let deck = Deck::new(name);
        let mut decks = self.get_decks()?;
        decks.push(deck.clone());
        self.save_decks(&decks)?;

        info!("Deck '{}' created", deck.name);
        Ok(deck)
    }

    /// Adds a complete deck, e.g. one read from a JSON export.
    ///
    /// A deck whose name or id is already stored is rejected.
    fn import_deck(&self, deck: Deck) -> Result<Deck> {
        let mut decks = self.get_decks()?;
        if decks.iter().any(|d| d.name == deck.name || d.id == deck.id) {
            return Err(ReviewError::InvalidInput(format!(
                "deck '{}' already exists, rename it in the JSON file",
                deck.name
            )));
        }

        decks.push(deck.clone());
        self.save_decks(&decks)?;

        info!(
            "Deck '{}' imported with {} cards",
            deck.name,
            deck.cards.len()
        );
        Ok(deck)
    }

    /// Removes a deck together with all of its cards.
    fn delete_deck(&self, deck_id: &str) -> Result<Deck> {
        let mut decks = self.get_decks()?;
        let pos = decks
            .iter()
            .position(|d| d.id == deck_id)
            .ok_or_else(|| ReviewError::DeckNotFound(deck_id.to_string()))?;
        let removed = decks.remove(pos);
        self.save_decks(&decks)?;

        info!(
            "Deck '{}' deleted with {} cards",
            removed.name,
            removed.cards.len()
        );
        Ok(removed)
    }

    /// Appends a fresh card, due at `now`, to the end of a deck.
    fn add_card(&self, deck_id: &str, front: &str, back: &str, now: i64) -> Result<Card> {
        if front.trim().is_empty() || back.trim().is_empty() {
            return Err(ReviewError::InvalidInput(
                "card front and back must both be filled in".to_string(),
            ));
        }

        let mut decks = self.get_decks()?;
        let deck = decks
            .iter_mut()
            .find(|d| d.id == deck_id)
            .ok_or_else(|| ReviewError::DeckNotFound(deck_id.to_string()))?;

        let card = Card::new(front, back, now);
        deck.cards.push(card.clone());
        self.save_decks(&decks)?;

        Ok(card)
    }

    fn delete_card(&self, deck_id: &str, card_id: &str) -> Result<Card> {
        let mut decks = self.get_decks()?;
        let deck = decks
            .iter_mut()
            .find(|d| d.id == deck_id)
            .ok_or_else(|| ReviewError::DeckNotFound(deck_id.to_string()))?;
        let pos = deck
            .cards
            .iter()
            .position(|c| c.id == card_id)
            .ok_or_else(|| ReviewError::CardNotFound {
                deck_id: deck_id.to_string(),
                card_id: card_id.to_string(),
            })?;

        let removed = deck.cards.remove(pos);
        self.save_decks(&decks)?;
        Ok(removed)
    }
}

/// Records achievements. Unlocking is a set-membership check on the id.
pub trait AchievementNotifier {
    /// Returns true if the achievement was newly unlocked, false if it already was.
    fn unlock_achievement(
        &self,
        id: &str,
        title: &str,
        icon: &str,
    ) -> std::result::Result<bool, StorageError>;

    fn achievements(&self) -> std::result::Result<Vec<Achievement>, StorageError>;
}
