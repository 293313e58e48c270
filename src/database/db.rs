//! SQLite key/value storage.
//!
//! Each key holds one whole JSON collection, mirroring browser local-storage:
//! callers read a collection, change it and write all of it back.

use crate::error::StorageError;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

pub const DECKS_KEY: &str = "flashcards";
pub const ACHIEVEMENTS_KEY: &str = "achievements";
/// Simulated days added to the wall clock by "Next Day".
pub const DAY_OFFSET_KEY: &str = "day_offset";

/// Opens (creating if needed) the database file and its key/value table.
pub fn init_database(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    debug!("Opened database at {}", path.display());
    Ok(conn)
}

pub fn init_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;
    Ok(())
}

/// Reads the JSON value stored under `key`, if any.
pub fn get_value<T: DeserializeOwned>(
    key: &str,
    conn: &Connection,
) -> Result<Option<T>, StorageError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Replaces the value stored under `key`.
pub fn set_value<T: Serialize + ?Sized>(
    key: &str,
    value: &T,
    conn: &Connection,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
        params![key, json],
    )?;
    Ok(())
}

/// Reads the collection stored under `key`; a missing key is an empty collection.
pub fn get_collection<T: DeserializeOwned>(
    key: &str,
    conn: &Connection,
) -> Result<Vec<T>, StorageError> {
    Ok(get_value(key, conn)?.unwrap_or_default())
}

/// Replaces the collection stored under `key`.
pub fn set_collection<T: Serialize>(
    key: &str,
    items: &[T],
    conn: &Connection,
) -> Result<(), StorageError> {
    set_value(key, items, conn)
}
