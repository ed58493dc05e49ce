//! Seeding of the default categories on first use.

use rusqlite::Connection;

use crate::{
    Error,
    category::{Category, CategoryName, create_category},
    db::insert_failed,
};

/// The definition of a category to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCategory<'a> {
    /// The display label, must not be empty.
    pub name: &'a str,
    /// An opaque icon identifier.
    pub icon: &'a str,
}

/// The categories a new ledger starts with, in display order.
pub const DEFAULT_CATEGORIES: [NewCategory<'static>; 5] = [
    NewCategory {
        name: "Food",
        icon: "restaurant",
    },
    NewCategory {
        name: "Transport",
        icon: "directions_car",
    },
    NewCategory {
        name: "Leisure",
        icon: "sports_esports",
    },
    NewCategory {
        name: "Fixed Expenses",
        icon: "home",
    },
    NewCategory {
        name: "Extra Costs",
        icon: "shopping_cart",
    },
];

/// Create one category per definition, in order, as a single unit of work.
///
/// Either every category is created or, if any insert fails, none are. This
/// function does not check whether seeding has happened before; calling it
/// twice creates the categories twice.
///
/// # Errors
/// Returns [Error::EmptyCategoryName] if a definition has a blank name, or
/// [Error::InsertFailed] if the database rejects a write. In both cases nothing
/// from this call is persisted.
pub fn seed_default_categories(
    definitions: &[NewCategory<'_>],
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let transaction = connection.unchecked_transaction().map_err(insert_failed)?;

    let categories = insert_categories(definitions, &transaction)?;

    transaction.commit().map_err(insert_failed)?;

    tracing::info!("Seeded {} default categories", categories.len());

    Ok(categories)
}

/// Insert `definitions` without opening a transaction of its own.
///
/// Callers that already hold a transaction use this so the inserts commit
/// together with their other writes.
pub(crate) fn insert_categories(
    definitions: &[NewCategory<'_>],
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    definitions
        .iter()
        .map(|definition| {
            let name = CategoryName::new(definition.name)?;
            create_category(name, definition.icon, connection)
        })
        .collect()
}
