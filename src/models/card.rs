//! Card is a pair <front, back> plus its spaced repetition schedule.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower bound for a card's ease.
pub const MIN_EASE: f64 = 1.3;
/// Ease given to freshly created cards.
pub const DEFAULT_EASE: f64 = 2.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default = "new_id")]
    pub id: String,
    pub front: String,
    pub back: String,
    /// Milliseconds since the Unix epoch at which the card becomes reviewable.
    #[serde(default)]
    pub due_date: i64,
    /// Whole days until the next review.
    #[serde(default)]
    pub interval: u32,
    #[serde(default = "default_ease")]
    pub ease: f64,
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_ease() -> f64 {
    DEFAULT_EASE
}

impl Card {
    /// Creates a card that is due immediately.
    pub fn new(front: impl Into<String>, back: impl Into<String>, now: i64) -> Self {
        Self {
            id: new_id(),
            front: front.into(),
            back: back.into(),
            due_date: now,
            interval: 0,
            ease: DEFAULT_EASE,
        }
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.due_date <= now
    }
}
