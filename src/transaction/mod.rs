mod core;

pub use core::{
    NewTransaction, Transaction, TransactionId, create_transaction_table, map_row_to_transaction,
    recent_transactions, upsert_transactions,
};

#[cfg(test)]
pub(crate) use core::test_new_transaction;
