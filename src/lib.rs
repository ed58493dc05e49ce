//! Expense ledger is a small personal finance store.
//!
//! Users record transactions against categories and the ledger answers
//! aggregate queries: how much was spent today, this month, this year, and
//! how much was spent in each category.
//!
//! The entry point is [Ledger], which owns the SQLite connection and exposes
//! the write and read paths.

#![warn(missing_docs)]

mod category;
mod database_id;
mod db;
mod format;
mod ledger;
mod preferences;
mod seed;
mod timezone;
mod transaction;

pub use category::{Category, CategoryName};
pub use database_id::{CategoryId, TransactionId};
pub use db::initialize as initialize_db;
pub use format::currency;
pub use ledger::{Ledger, LedgerConfig, SummaryTotals};
pub use preferences::FIRST_TIME_LOGIN_KEY;
pub use seed::{DEFAULT_CATEGORIES, NewCategory};
pub use timezone::get_timezone;
pub use transaction::{CategoryTotal, Transaction, Window, WindowRange, compute_window_range};

/// The errors that may occur in the ledger.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The database could not be opened or its schema could not be created.
    ///
    /// This is fatal for the caller: nothing else will work without a store.
    #[error("the ledger database is unavailable: {0}")]
    StorageUnavailable(String),

    /// The store rejected a write, e.g. because the disk is full.
    ///
    /// Previously committed data is unaffected and the caller may retry.
    #[error("could not save to the ledger database: {0}")]
    InsertFailed(String),

    /// The category ID used to create a transaction did not match a category.
    #[error("the category ID {0} does not refer to a valid category")]
    UnknownCategory(CategoryId),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The requested row was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The canonical timezone name could not be resolved.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A calendar window reaches past the dates that can be represented.
    #[error("the date is outside the supported range")]
    DateOutOfRange,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
