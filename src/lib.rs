pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use clock::{Clock, ManualClock, OffsetClock, SystemClock};
pub use config::Config;
pub use database::{AchievementNotifier, DeckRepository, MemoryStore, Store};
pub use error::{ReviewError, StorageError};
pub use models::{Achievement, Card, Deck, Grade, ReviewController, ReviewSession, ReviewState};
