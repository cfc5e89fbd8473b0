//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// Alias for IDs of rows in the transaction table.
pub type TransactionID = DatabaseID;

/// Alias for IDs of rows in the category table.
pub type CategoryID = DatabaseID;
