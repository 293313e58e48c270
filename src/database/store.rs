//! SQLite-backed deck repository and achievement notifier.
use super::db::{self, ACHIEVEMENTS_KEY, DAY_OFFSET_KEY, DECKS_KEY};
use super::repository::{AchievementNotifier, DeckRepository};
use crate::error::StorageError;
use crate::models::achievement::unlock_into;
use crate::models::{Achievement, Deck};
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(db::init_in_memory()?))
    }

    /// Simulated days saved by the last "Next Day"; 0 when never advanced.
    pub fn load_day_offset(&self) -> Result<i64, StorageError> {
        let conn = self.lock()?;
        Ok(db::get_value(DAY_OFFSET_KEY, &conn)?.unwrap_or(0))
    }

    pub fn save_day_offset(&self, days: i64) -> Result<(), StorageError> {
        let conn = self.lock()?;
        db::set_value(DAY_OFFSET_KEY, &days, &conn)?;
        info!("Simulated date moved {} days ahead", days);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl DeckRepository for Store {
    fn get_decks(&self) -> Result<Vec<Deck>, StorageError> {
        let conn = self.lock()?;
        db::get_collection(DECKS_KEY, &conn)
    }

    fn save_decks(&self, decks: &[Deck]) -> Result<(), StorageError> {
        let conn = self.lock()?;
        db::set_collection(DECKS_KEY, decks, &conn)
    }
}

impl AchievementNotifier for Store {
    fn unlock_achievement(&self, id: &str, title: &str, icon: &str) -> Result<bool, StorageError> {
        let conn = self.lock()?;
        let mut unlocked: Vec<Achievement> = db::get_collection(ACHIEVEMENTS_KEY, &conn)?;
        if !unlock_into(&mut unlocked, id, title, icon) {
            return Ok(false);
        }
        db::set_collection(ACHIEVEMENTS_KEY, &unlocked, &conn)?;
        info!("Achievement unlocked: {} {}", icon, title);
        Ok(true)
    }

    fn achievements(&self) -> Result<Vec<Achievement>, StorageError> {
        let conn = self.lock()?;
        db::get_collection(ACHIEVEMENTS_KEY, &conn)
    }
}
