//! Unlocked achievements. Identity is the `id`; an id is unlocked at most once.
use serde::{Deserialize, Serialize};

/// Unlocked after finishing a flashcard review session.
pub const FLASHCARD_ACHIEVEMENT_ID: &str = "flashcards_done";
pub const FLASHCARD_ACHIEVEMENT_TITLE: &str = "Flashcard Master";
pub const FLASHCARD_ACHIEVEMENT_ICON: &str = "🃏";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub icon: String,
    /// RFC 3339 timestamp.
    pub unlocked_at: String,
}

impl Achievement {
    pub fn new(id: &str, title: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            unlocked_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Appends a new achievement unless one with the same id is already present.
/// Returns true when `unlocked` grew.
pub fn unlock_into(unlocked: &mut Vec<Achievement>, id: &str, title: &str, icon: &str) -> bool {
    if unlocked.iter().any(|a| a.id == id) {
        return false;
    }
    unlocked.push(Achievement::new(id, title, icon));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_is_idempotent() {
        let mut unlocked = Vec::new();

        assert!(unlock_into(&mut unlocked, "a", "A", "*"));
        assert!(!unlock_into(&mut unlocked, "a", "A again", "*"));
        assert!(unlock_into(&mut unlocked, "b", "B", "*"));

        assert_eq!(unlocked.len(), 2);
        assert_eq!(unlocked[0].title, "A");
    }
}
