//! JSON import/export module for flashcard decks.
//! Provides functionality to save and load Deck structures to/from JSON files.

use crate::error::StorageError;
use crate::models::Deck;
use crate::models::card::{MIN_EASE, new_id};
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Exports a deck, including each card's schedule, to a pretty-printed JSON file.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<(), StorageError> {
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path, json_string)?;
    info!("Deck '{}' exported to {}", deck.name, path.display());
    Ok(())
}

/// Imports a deck from a JSON file.
///
/// Cards only need `front` and `back`; anything else missing starts as a new
/// card. Eases below the floor are raised to it, and a card reusing an id seen
/// earlier in the deck gets a new one so every card id is unique.
pub fn import_json(path: &Path) -> Result<Deck, StorageError> {
    let contents = fs::read_to_string(path)?;
    let mut deck: Deck = serde_json::from_str(&contents)?;

    let mut seen = HashSet::new();
    for card in &mut deck.cards {
        if !seen.insert(card.id.clone()) {
            let fresh = new_id();
            warn!(
                "Card '{}' reused id {}, assigned {}",
                card.front, card.id, fresh
            );
            card.id = fresh;
            seen.insert(card.id.clone());
        }
        if card.ease.is_nan() || card.ease < MIN_EASE {
            warn!(
                "Card '{}' had ease {}, raised to {}",
                card.front, card.ease, MIN_EASE
            );
            card.ease = MIN_EASE;
        }
    }

    info!("Deck '{}' imported from {}", deck.name, path.display());
    Ok(deck)
}
