pub mod db;
pub mod memory;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use repository::{AchievementNotifier, DeckRepository};
pub use store::Store;
