//! Database ID type definitions.

/// Identifier the store assigns to a category.
pub type CategoryId = i64;

/// Identifier the store assigns to a transaction.
pub type TransactionId = i64;
