//! Transactions and the aggregate queries over them.
//!
//! This module contains:
//! - The `Transaction` model and the functions for storing it
//! - Calendar windows (day, month, year) resolved against an explicit "now"
//! - Queries that resolve the transactions in a window and sum amounts

mod core;
mod query;
mod window;

pub use core::{
    Transaction, count_transactions, create_transaction, create_transaction_table, get_transaction,
};
pub use query::{
    CategoryTotal, get_category_totals, get_total_for_category, get_total_for_ids,
    get_transaction_ids_in_window,
};
pub use window::{Window, WindowRange, compute_window_range};
