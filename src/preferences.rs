//! Persisted preference flags.
//!
//! This module stores boolean flags in the ledger database, most importantly
//! the first-run flag that gates seeding of the default categories.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, db::insert_failed};

/// The key of the flag that is set until the first-time setup has run.
pub const FIRST_TIME_LOGIN_KEY: &str = "first_time_login";

/// Create the preference table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_preference_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS preference (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Gets the flag stored under `key`, or `default` if it has never been set.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn get_flag(key: &str, default: bool, connection: &Connection) -> Result<bool, Error> {
    let value = connection
        .prepare("SELECT value FROM preference WHERE key = ?1")?
        .query_row([key], |row| row.get::<_, bool>(0))
        .optional()?;

    Ok(value.unwrap_or(default))
}

/// Saves `value` under `key`, replacing any previous value.
///
/// # Errors
/// Returns [Error::InsertFailed] if the database rejects the write.
pub(crate) fn set_flag(key: &str, value: bool, connection: &Connection) -> Result<(), Error> {
    connection
        .execute(
            "INSERT INTO preference (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )
        .map_err(insert_failed)?;

    Ok(())
}
