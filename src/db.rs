//! Sets up the tables for the application database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    category::create_category_table,
    history::create_history_tables,
    settings::create_user_settings_table,
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the application models.
///
/// All tables are created in a single exclusive transaction so that a
/// partially initialized schema is never left behind.
///
/// # Errors
///
/// This function will return an error if any of the SQL queries failed.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_user_settings_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_history_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");

        initialize(&connection).expect("Could not initialize database");

        let mut statement = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let table_names: Vec<String> = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();

        for want in [
            "category",
            "month_history",
            "transaction",
            "user",
            "user_settings",
            "year_history",
        ] {
            assert!(
                table_names.iter().any(|name| name == want),
                "want table {want} in {table_names:?}"
            );
        }
    }

    #[test]
    fn is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");

        initialize(&connection).expect("Could not initialize database");
        initialize(&connection).expect("Second initialization should succeed");
    }
}
