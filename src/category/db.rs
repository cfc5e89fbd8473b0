//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::CategoryID,
    transaction::TransactionKind,
    user::UserID,
};

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            icon TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id),
            UNIQUE(user_id, name, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategory] if the user already has a category with this name and kind,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    kind: TransactionKind,
    icon: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (user_id, name, kind, icon) VALUES (?1, ?2, ?3, ?4);",
            (user_id.as_i64(), name.as_ref(), kind, icon),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategory(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name,
        kind,
        icon: icon.to_owned(),
    })
}

/// Retrieve all of the user's categories, ordered by kind then name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, icon FROM category
            WHERE user_id = :user_id
            ORDER BY kind ASC, name ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Look up one of the user's categories by name and kind.
///
/// Used when creating a transaction to validate the chosen category and
/// snapshot its icon.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if the user has no category with this name and kind,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category_by_name(
    user_id: UserID,
    name: &str,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, icon FROM category
            WHERE user_id = :user_id AND name = :name AND kind = :kind;",
        )?
        .query_row(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":name": name,
                ":kind": kind,
            },
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::CategoryNotFound(name.to_owned()),
            error => error.into(),
        })
}

/// Delete one of the user's categories by ID.
///
/// Existing transactions keep their category name and icon snapshots.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `category_id` does not refer to one of the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    category_id: CategoryID,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let raw_name: String = row.get(2)?;
    let kind = row.get(3)?;
    let icon = row.get(4)?;

    Ok(Category {
        id,
        user_id: UserID::new(raw_user_id),
        name: CategoryName::new_unchecked(&raw_name),
        kind,
        icon,
    })
}
