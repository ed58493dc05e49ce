//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::CategoryId,
    db::insert_failed,
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// Returns [Error::InsertFailed] if the database rejects the write.
pub fn create_category(
    name: CategoryName,
    icon: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = connection
        .prepare("INSERT INTO category (name, icon) VALUES (?1, ?2) RETURNING id, name, icon;")
        .and_then(|mut statement| statement.query_row((name.as_ref(), icon), map_row))
        .map_err(insert_failed)?;

    tracing::debug!("Created category {} ({})", category.id, category.name);

    Ok(category)
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `category_id` does not refer to a category.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, icon FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories in the order they were created.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, icon FROM category ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            icon TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let icon = row.get(2)?;

    Ok(Category { id, name, icon })
}
