//! Implements the ledger handle that owns the database connection.

use std::{
    collections::BTreeSet,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    Error,
    category::{Category, CategoryName, create_category, get_all_categories, get_category},
    database_id::{CategoryId, TransactionId},
    db::{initialize, insert_failed},
    format::round_to_cents,
    preferences::{FIRST_TIME_LOGIN_KEY, get_flag, set_flag},
    seed::{NewCategory, insert_categories, seed_default_categories},
    timezone::get_timezone,
    transaction::{
        CategoryTotal, Transaction, Window, count_transactions, create_transaction,
        get_category_totals, get_total_for_category, get_total_for_ids, get_transaction,
        get_transaction_ids_in_window,
    },
};

/// Settings that control how a [Ledger] interprets dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Day, month and year windows follow this timezone's calendar.
    pub local_timezone: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            local_timezone: "Etc/UTC".to_owned(),
        }
    }
}

/// The totals shown on the summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// The sum of today's transactions.
    pub day: f64,
    /// The sum of this month's transactions.
    pub month: f64,
    /// The sum of this year's transactions.
    pub year: f64,
}

impl SummaryTotals {
    /// The total for `window`.
    pub fn get(&self, window: Window) -> f64 {
        match window {
            Window::Day => self.day,
            Window::Month => self.month,
            Window::Year => self.year,
        }
    }
}

/// A handle to an expense ledger stored in SQLite.
///
/// The handle owns the only connection to the database. Every operation locks
/// the connection for its duration, so operations from different threads are
/// serialised and a write is visible to every read that starts after it
/// returns. Cloning the handle shares the connection.
#[derive(Clone)]
pub struct Ledger {
    connection: Arc<Mutex<Connection>>,
    timezone: &'static Tz,
}

impl Ledger {
    /// Open the ledger stored at `path`, creating the file and schema if needed.
    ///
    /// # Errors
    /// Returns [Error::StorageUnavailable] if the database cannot be opened or
    /// initialized, or [Error::InvalidTimezone] if the configured timezone is
    /// not a canonical timezone name.
    pub fn open(path: impl AsRef<Path>, config: &LedgerConfig) -> Result<Self, Error> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(|error| {
            tracing::error!("Could not open the database at {path:?}: {error}");
            Error::StorageUnavailable(error.to_string())
        })?;

        tracing::info!("Opened ledger database at {path:?}");

        Self::new(connection, config)
    }

    /// Open a ledger that lives only in memory.
    ///
    /// # Errors
    /// See [Ledger::open].
    pub fn open_in_memory(config: &LedgerConfig) -> Result<Self, Error> {
        let connection = Connection::open_in_memory()
            .map_err(|error| Error::StorageUnavailable(error.to_string()))?;

        Self::new(connection, config)
    }

    /// Create a ledger from an existing connection.
    ///
    /// This function enables foreign key checks and adds the ledger tables to
    /// the database if they do not exist.
    ///
    /// # Errors
    /// See [Ledger::open].
    pub fn new(connection: Connection, config: &LedgerConfig) -> Result<Self, Error> {
        let timezone = get_timezone(&config.local_timezone)?;

        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(|error| Error::StorageUnavailable(error.to_string()))?;
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            timezone,
        })
    }

    /// The timezone whose calendar the windows follow.
    pub fn timezone(&self) -> &'static Tz {
        self.timezone
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }

    // ========== Write path ==========

    /// Create a category and return its ID.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategoryName] if `name` is blank, or
    /// [Error::InsertFailed] if the database rejects the write.
    pub fn add_category(&self, name: &str, icon: &str) -> Result<CategoryId, Error> {
        let name = CategoryName::new(name)?;
        let connection = self.connection()?;

        create_category(name, icon, &connection).map(|category| category.id)
    }

    /// Record a transaction and return its ID.
    ///
    /// # Errors
    /// Returns [Error::UnknownCategory] if `category_id` does not refer to a
    /// category, or [Error::InsertFailed] if the database rejects the write.
    pub fn add_transaction(
        &self,
        amount: f64,
        timestamp: OffsetDateTime,
        category_id: CategoryId,
    ) -> Result<TransactionId, Error> {
        let connection = self.connection()?;

        create_transaction(amount, timestamp, category_id, &connection)
            .map(|transaction| transaction.id)
    }

    /// Create one category per definition, in order, all or nothing.
    ///
    /// This does not consult the first-run flag; see
    /// [Ledger::run_first_time_setup] for the guarded version.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategoryName] if a definition has a blank name, or
    /// [Error::InsertFailed] if the database rejects a write. Nothing from the
    /// call is persisted in either case.
    pub fn seed_default_categories(
        &self,
        definitions: &[NewCategory<'_>],
    ) -> Result<Vec<CategoryId>, Error> {
        let connection = self.connection()?;

        let categories = seed_default_categories(definitions, &connection)?;

        Ok(categories.iter().map(|category| category.id).collect())
    }

    /// Seed `definitions` if this is the first run of the ledger.
    ///
    /// The first-run flag is cleared in the same database transaction as the
    /// seeding, so the categories are created exactly once even if the process
    /// stops part way through. Returns whether the categories were created.
    ///
    /// # Errors
    /// Returns the error of the failed insert; the flag stays set so the next
    /// call tries again.
    pub fn run_first_time_setup(&self, definitions: &[NewCategory<'_>]) -> Result<bool, Error> {
        let connection = self.connection()?;
        let transaction = connection.unchecked_transaction().map_err(insert_failed)?;

        if !get_flag(FIRST_TIME_LOGIN_KEY, true, &transaction)? {
            tracing::debug!("First-time setup already done, skipping");
            return Ok(false);
        }

        tracing::info!("User first login registered, seeding default categories");

        insert_categories(definitions, &transaction)?;
        set_flag(FIRST_TIME_LOGIN_KEY, false, &transaction)?;
        transaction.commit().map_err(insert_failed)?;

        Ok(true)
    }

    // ========== Read path ==========

    /// Get every category in the order they were created.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn list_categories(&self) -> Result<Vec<Category>, Error> {
        let connection = self.connection()?;

        get_all_categories(&connection)
    }

    /// Get a single category.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `category_id` does not refer to a category.
    pub fn get_category(&self, category_id: CategoryId) -> Result<Category, Error> {
        let connection = self.connection()?;

        get_category(category_id, &connection)
    }

    /// Get a single transaction.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `transaction_id` does not refer to a transaction.
    pub fn get_transaction(&self, transaction_id: TransactionId) -> Result<Transaction, Error> {
        let connection = self.connection()?;

        get_transaction(transaction_id, &connection)
    }

    /// The number of transactions recorded in the ledger.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn transaction_count(&self) -> Result<u32, Error> {
        let connection = self.connection()?;

        count_transactions(&connection)
    }

    /// Get the IDs of the transactions in `window` for the instant `now`.
    ///
    /// # Errors
    /// Returns [Error::DateOutOfRange] if the window cannot be represented, or
    /// [Error::SqlError] if the query fails.
    pub fn transaction_ids_in_window(
        &self,
        window: Window,
        now: OffsetDateTime,
    ) -> Result<BTreeSet<TransactionId>, Error> {
        let connection = self.connection()?;

        get_transaction_ids_in_window(window, now, self.timezone, &connection)
    }

    /// Sum the transactions with the given IDs, ignoring unknown IDs.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn total_for_ids(&self, ids: &BTreeSet<TransactionId>) -> Result<f64, Error> {
        let connection = self.connection()?;

        get_total_for_ids(ids, &connection)
    }

    /// Sum every transaction in a category; `0.0` for unknown categories.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn total_for_category(&self, category_id: CategoryId) -> Result<f64, Error> {
        let connection = self.connection()?;

        get_total_for_category(category_id, &connection)
    }

    /// The day, month and year totals for the instant `now`.
    ///
    /// All three windows are resolved against the same `now` under one lock,
    /// so a concurrent write cannot make the day total exceed the month total.
    ///
    /// # Errors
    /// Returns [Error::DateOutOfRange] if a window around `now` cannot be
    /// represented, or [Error::SqlError] if a query fails.
    pub fn summary_totals(&self, now: OffsetDateTime) -> Result<SummaryTotals, Error> {
        let connection = self.connection()?;

        let total_for = |window| -> Result<f64, Error> {
            let ids = get_transaction_ids_in_window(window, now, self.timezone, &connection)?;
            get_total_for_ids(&ids, &connection)
        };

        Ok(SummaryTotals {
            day: total_for(Window::Day)?,
            month: total_for(Window::Month)?,
            year: total_for(Window::Year)?,
        })
    }

    /// The all-time total of each category whose total is at least a cent.
    ///
    /// Categories are in the order they were created. Totals keep their full
    /// precision; only the check for zero is made on the total rounded to
    /// cents.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn category_breakdown(&self) -> Result<Vec<CategoryTotal>, Error> {
        let connection = self.connection()?;

        let totals = get_category_totals(&connection)?
            .into_iter()
            .filter(|category_total| round_to_cents(category_total.total) != 0.0)
            .collect();

        Ok(totals)
    }
}
