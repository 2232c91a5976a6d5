mod core;
mod delete_endpoint;
mod list_endpoint;

pub use core::{
    Account, AccountId, AccountRef, NewAccount, account_refs_by_external_id, create_account_table,
    delete_account, list_accounts, map_row_to_account, update_account_balances, upsert_account,
};
pub use delete_endpoint::delete_account_endpoint;
pub use list_endpoint::get_accounts_endpoint;

#[cfg(test)]
pub(crate) use core::test_new_account;
