//! Aggregate queries over transactions: id sets for windows and sums.

use std::collections::BTreeSet;

use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::{CategoryId, TransactionId},
};

use super::window::{Window, WindowRange, compute_window_range};

/// The most ids bound to a single `IN (...)` query.
///
/// SQLite limits the number of parameters per statement, so larger id sets are
/// summed in chunks.
const MAX_IDS_PER_QUERY: usize = 500;

/// A category and the sum of all its transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category that was totalled.
    pub category: Category,
    /// The sum of the amounts of every transaction in the category.
    pub total: f64,
}

/// Get the IDs of the transactions that fall in `window` for the instant `now`.
///
/// The window is the local calendar day, month or year in `timezone`.
/// An empty set means there were no transactions in the window.
///
/// # Errors
/// Returns [Error::DateOutOfRange] if the window cannot be represented, or
/// [Error::SqlError] if the query fails.
pub fn get_transaction_ids_in_window(
    window: Window,
    now: OffsetDateTime,
    timezone: &Tz,
    connection: &Connection,
) -> Result<BTreeSet<TransactionId>, Error> {
    let range = compute_window_range(window, now, timezone)?;

    get_transaction_ids_in_range(range, connection)
}

/// Get the IDs of the transactions with `range.start <= timestamp < range.end`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transaction_ids_in_range(
    range: WindowRange,
    connection: &Connection,
) -> Result<BTreeSet<TransactionId>, Error> {
    connection
        .prepare(
            "SELECT id FROM \"transaction\" WHERE timestamp >= ?1 AND timestamp < ?2 ORDER BY id",
        )?
        .query_map(
            (range.start.unix_timestamp(), range.end.unix_timestamp()),
            |row| row.get::<_, TransactionId>(0),
        )?
        .map(|maybe_id| maybe_id.map_err(|error| error.into()))
        .collect()
}

/// Sum the amounts of the transactions with the given `ids`.
///
/// Returns `0.0` for an empty set. IDs that do not refer to a transaction are
/// ignored rather than treated as an error, so a stale id set still totals
/// whatever remains of it.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_total_for_ids(
    ids: &BTreeSet<TransactionId>,
    connection: &Connection,
) -> Result<f64, Error> {
    let ids: Vec<TransactionId> = ids.iter().copied().collect();
    let mut total = 0.0;

    for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let query = format!(
            "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\" WHERE id IN ({placeholders})"
        );

        let chunk_total: f64 = connection
            .prepare(&query)?
            .query_row(params_from_iter(chunk), |row| row.get(0))?;

        total += chunk_total;
    }

    Ok(total)
}

/// Sum the amounts of every transaction in the category, regardless of date.
///
/// Returns `0.0` both when the category has no transactions and when
/// `category_id` does not refer to a category; the two cases are not
/// distinguished.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_total_for_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\" WHERE category_id = :category_id",
        )?
        .query_row(&[(":category_id", &category_id)], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get every category with the all-time total of its transactions.
///
/// Categories are returned in the order they were created. Categories without
/// transactions have a total of `0.0`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_category_totals(connection: &Connection) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category.id, category.name, category.icon, COALESCE(SUM(\"transaction\".amount), 0.0)
             FROM category
             LEFT JOIN \"transaction\" ON \"transaction\".category_id = category.id
             GROUP BY category.id
             ORDER BY category.id ASC",
        )?
        .query_map([], |row| {
            let raw_name: String = row.get(1)?;

            Ok(CategoryTotal {
                category: Category {
                    id: row.get(0)?,
                    name: CategoryName::new_unchecked(&raw_name),
                    icon: row.get(2)?,
                },
                total: row.get(3)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}
