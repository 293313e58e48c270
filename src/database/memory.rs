//! In-memory stand-in for the persisted collections.
use super::repository::{AchievementNotifier, DeckRepository};
use crate::error::StorageError;
use crate::models::achievement::unlock_into;
use crate::models::{Achievement, Deck};
use std::cell::{Cell, RefCell};

#[derive(Debug, Default)]
pub struct MemoryStore {
    decks: RefCell<Vec<Deck>>,
    achievements: RefCell<Vec<Achievement>>,
    saves: Cell<usize>,
    unlock_calls: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decks(decks: Vec<Deck>) -> Self {
        Self {
            decks: RefCell::new(decks),
            ..Self::default()
        }
    }

    /// Number of whole-collection writes so far.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Number of unlock requests so far, including repeats.
    pub fn unlock_calls(&self) -> usize {
        self.unlock_calls.get()
    }
}

impl DeckRepository for MemoryStore {
    fn get_decks(&self) -> Result<Vec<Deck>, StorageError> {
        Ok(self.decks.borrow().clone())
    }

    fn save_decks(&self, decks: &[Deck]) -> Result<(), StorageError> {
        *self.decks.borrow_mut() = decks.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

impl AchievementNotifier for MemoryStore {
    fn unlock_achievement(&self, id: &str, title: &str, icon: &str) -> Result<bool, StorageError> {
        self.unlock_calls.set(self.unlock_calls.get() + 1);
        Ok(unlock_into(
            &mut self.achievements.borrow_mut(),
            id,
            title,
            icon,
        ))
    }

    fn achievements(&self) -> Result<Vec<Achievement>, StorageError> {
        Ok(self.achievements.borrow().clone())
    }
}
