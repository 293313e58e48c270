//! Error types shared by the persistence layer and the review core.

use thiserror::Error;

/// Failures of the key/value persistence underneath the repositories.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

/// Failures surfaced by deck management and the review session controller.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Invalid grade: {0} (expected 1-4)")]
    InvalidGrade(u8),

    #[error("Cannot {action} while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Card {card_id} not found in deck {deck_id}")]
    CardNotFound { deck_id: String, card_id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ReviewError {
    /// True for both deck and card lookups that came back empty.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReviewError::DeckNotFound(_) | ReviewError::CardNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
