//! Schema creation and error mapping shared by the ledger's tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, preferences::create_preference_table,
    transaction::create_transaction_table,
};

/// Create the ledger tables and indexes if they do not already exist.
///
/// The tables are created in a single exclusive transaction, so a failure
/// leaves the database as it was. Calling this on an initialized database is a
/// no-op.
///
/// # Errors
/// Returns [Error::StorageUnavailable] if any table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let create_tables = || -> Result<(), rusqlite::Error> {
        let transaction =
            SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

        create_category_table(&transaction)?;
        create_transaction_table(&transaction)?;
        create_preference_table(&transaction)?;

        transaction.commit()
    };

    create_tables().map_err(|error| {
        tracing::error!("Could not create the ledger schema: {error}");
        Error::StorageUnavailable(error.to_string())
    })
}

/// Convert an error from an `INSERT` statement into [Error::InsertFailed].
pub(crate) fn insert_failed(error: rusqlite::Error) -> Error {
    tracing::error!("Insert rejected by the database: {error}");
    Error::InsertFailed(error.to_string())
}
