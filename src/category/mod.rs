//! Categories that transactions are recorded against.

mod db;
mod domain;

pub use db::{create_category, create_category_table, get_all_categories, get_category};
pub use domain::{Category, CategoryName};
