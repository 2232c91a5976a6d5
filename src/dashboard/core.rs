//! Pure aggregation functions over the user's synced accounts.

use crate::account::Account;

/// The account types counted towards spendable cash.
const DEPOSITORY_TYPES: [&str; 3] = ["depository", "checking", "savings"];

/// The account types that represent revolving credit.
const CREDIT_TYPES: [&str; 2] = ["credit", "credit_card"];

fn is_depository(account: &Account) -> bool {
    DEPOSITORY_TYPES.contains(&account.account_type.as_str())
}

fn is_credit(account: &Account) -> bool {
    CREDIT_TYPES.contains(&account.account_type.as_str())
}

/// The sum of current balances across depository accounts.
pub fn total_depository_balance(accounts: &[Account]) -> f64 {
    accounts
        .iter()
        .filter(|account| is_depository(account))
        .map(|account| account.balance_current)
        .sum()
}

/// The total owed across credit accounts.
///
/// Balances on credit accounts may be reported negative, so magnitudes are
/// summed.
pub fn total_debt(accounts: &[Account]) -> f64 {
    accounts
        .iter()
        .filter(|account| is_credit(account))
        .map(|account| account.balance_current.abs())
        .sum()
}

/// The total credit available for spending across credit accounts.
pub fn credit_available(accounts: &[Account]) -> f64 {
    accounts
        .iter()
        .filter(|account| is_credit(account))
        .map(|account| account.balance_available.abs())
        .sum()
}

/// The total credit currently used across credit accounts.
pub fn credit_used(accounts: &[Account]) -> f64 {
    accounts
        .iter()
        .filter(|account| is_credit(account))
        .map(|account| account.balance_current.abs())
        .sum()
}
