//! The transaction log and its endpoints.
//!
//! Transactions are immutable once created except for deletion. Creating or
//! deleting a transaction also updates the history buckets in the same SQL
//! transaction, see [crate::history].

mod core;
mod create_endpoint;
mod delete_endpoint;
mod export;
mod new_transaction_page;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, TransactionKind, count_transactions, create_transaction,
    create_transaction_table, get_transaction, get_transactions_page,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use export::export_transactions_endpoint;
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page_view;
