//! Defines the core data model and database functions for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    db::insert_failed,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense, i.e. an event where money was spent in some category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent in this transaction.
    pub amount: f64,
    /// When the transaction happened, in UTC with one second precision.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// The timestamp is normalised to UTC and truncated to whole seconds.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownCategory] if `category_id` does not refer to a category,
/// - or [Error::InsertFailed] if the database rejects the write for any other reason.
pub fn create_transaction(
    amount: f64,
    timestamp: OffsetDateTime,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, timestamp, category_id)
             VALUES (?1, ?2, ?3)
             RETURNING id, amount, timestamp, category_id",
        )
        .and_then(|mut statement| {
            statement.query_row(
                (amount, timestamp.unix_timestamp(), category_id),
                map_transaction_row,
            )
        })
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::UnknownCategory(category_id),
            error => insert_failed(error),
        })?;

    tracing::debug!(
        "Created transaction {} of {} in category {}",
        transaction.id,
        transaction.amount,
        transaction.category_id
    );

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare("SELECT id, amount, timestamp, category_id FROM \"transaction\" WHERE id = :id")?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// Timestamps are stored as unix seconds so that window queries are integer
/// range scans over `idx_transaction_timestamp`.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                timestamp INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_timestamp ON \"transaction\"(timestamp);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let unix_timestamp: i64 = row.get(2)?;
    let timestamp = OffsetDateTime::from_unix_timestamp(unix_timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(error))
    })?;
    let category_id = row.get(3)?;

    Ok(Transaction {
        id,
        amount,
        timestamp,
        category_id,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use std::collections::HashSet;

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        database_id::CategoryId,
        db::initialize,
        transaction::{count_transactions, create_transaction, get_transaction},
    };

    fn get_test_connection() -> (Connection, CategoryId) {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        initialize(&conn).unwrap();
        let category = create_category(CategoryName::new_unchecked("Food"), "food", &conn)
            .expect("Could not create category");

        (conn, category.id)
    }

    #[test]
    fn create_succeeds() {
        let (conn, category_id) = get_test_connection();
        let amount = 12.3;
        let timestamp = datetime!(2025-10-05 12:30:00 UTC);

        let result = create_transaction(amount, timestamp, category_id, &conn);

        match result {
            Ok(transaction) => {
                assert!(transaction.id > 0);
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.timestamp, timestamp);
                assert_eq!(transaction.category_id, category_id);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_normalises_timestamp_to_utc() {
        let (conn, category_id) = get_test_connection();
        let timestamp = datetime!(2025-10-05 08:00:00 +13:00);

        let transaction = create_transaction(1.0, timestamp, category_id, &conn).unwrap();

        assert_eq!(transaction.timestamp, datetime!(2025-10-04 19:00:00 UTC));
        assert_eq!(transaction.timestamp.offset(), time::UtcOffset::UTC);
    }

    #[test]
    fn create_accepts_negative_amounts() {
        let (conn, category_id) = get_test_connection();

        let transaction =
            create_transaction(-20.5, datetime!(2025-10-05 0:00 UTC), category_id, &conn).unwrap();

        assert_eq!(transaction.amount, -20.5);
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let (conn, category_id) = get_test_connection();
        let invalid_id = category_id + 42;

        let result = create_transaction(123.45, datetime!(2025-10-04 0:00 UTC), invalid_id, &conn);

        assert_eq!(result, Err(Error::UnknownCategory(invalid_id)));
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn create_returns_distinct_ids() {
        let (conn, category_id) = get_test_connection();
        let timestamp = datetime!(2025-10-05 0:00 UTC);

        let ids: HashSet<_> = (1..=20)
            .map(|i| {
                create_transaction(i as f64, timestamp, category_id, &conn)
                    .expect("Could not create transaction")
                    .id
            })
            .collect();

        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn get_transaction_round_trips_fields() {
        let (conn, category_id) = get_test_connection();
        let inserted =
            create_transaction(3.5, datetime!(2024-08-07 12:00 UTC), category_id, &conn).unwrap();

        let selected = get_transaction(inserted.id, &conn);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_transaction_fails_on_invalid_id() {
        let (conn, category_id) = get_test_connection();
        let inserted =
            create_transaction(3.5, datetime!(2024-08-07 12:00 UTC), category_id, &conn).unwrap();

        let selected = get_transaction(inserted.id + 1, &conn);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_count() {
        let (conn, category_id) = get_test_connection();
        let timestamp = datetime!(2025-10-05 0:00 UTC);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(i as f64, timestamp, category_id, &conn)
                .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
