//! Transaction management for the finance manager.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validation of new transactions
//! - Database functions for storing, querying and deleting transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod get_endpoint;
mod list_endpoint;

pub use core::{
    CreateTransactionRequest, NewTransaction, Transaction, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, get_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
