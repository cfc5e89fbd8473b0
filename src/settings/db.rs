//! Database operations for user settings.

use rusqlite::Connection;

use crate::{
    Error,
    settings::{Currency, UserSettings},
    user::UserID,
};

/// Initialize the user settings table.
pub fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id INTEGER PRIMARY KEY,
            currency TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id)
        );",
        (),
    )?;

    Ok(())
}

/// Retrieve the user's settings.
///
/// # Errors
/// This function will return a:
/// - [Error::SettingsNotFound] if the user has not completed the settings wizard yet,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_settings(user_id: UserID, connection: &Connection) -> Result<UserSettings, Error> {
    connection
        .query_row(
            "SELECT currency FROM user_settings WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map(|currency| UserSettings { user_id, currency })
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::SettingsNotFound,
            error => error.into(),
        })
}

/// Create or replace the user's settings.
pub fn upsert_user_settings(
    user_id: UserID,
    currency: Currency,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    connection.execute(
        "INSERT INTO user_settings (user_id, currency) VALUES (?1, ?2)
        ON CONFLICT (user_id) DO UPDATE SET currency = excluded.currency",
        (user_id.as_i64(), currency),
    )?;

    Ok(UserSettings { user_id, currency })
}
