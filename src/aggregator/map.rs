//! Pure mapping from aggregator wire schemas to the normalized records the
//! persistence layer stores.
//!
//! Missing fields degrade to defaults instead of failing: an account with no
//! type becomes "depository" with zero balances, a transaction with no
//! description falls back to its counterparty name.

use time::{
    Date, OffsetDateTime,
    format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    account::{AccountId, NewAccount},
    aggregator::{
        FetchedTransaction,
        wire::{PlaidAccount, PlaidTransaction, TellerAccount, TellerTransaction},
    },
    transaction::NewTransaction,
};

const DEFAULT_ACCOUNT_NAME: &str = "Bank Account";
const DEFAULT_ACCOUNT_TYPE: &str = "depository";
const DEFAULT_INSTITUTION_NAME: &str = "Bank";
const DEFAULT_DESCRIPTION: &str = "Transaction";
const DEFAULT_CATEGORY: &str = "Uncategorized";
const DEFAULT_STATUS: &str = "posted";
const DEFAULT_TRANSACTION_TYPE: &str = "debit";

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Whether the account type uses the credit-card sign convention, where a
/// positive transaction amount is money spent.
pub fn is_credit_type(account_type: &str) -> bool {
    matches!(account_type, "credit" | "credit_card")
}

/// Flip a fetched transaction amount where needed so that stored amounts are
/// uniformly positive = inflow, negative = outflow.
pub fn normalized_amount(account_type: &str, amount: f64) -> f64 {
    if is_credit_type(account_type) {
        -amount
    } else {
        amount
    }
}

/// Attach a fetched transaction to its stored account, applying the sign
/// convention for the account's type.
pub fn normalize_transaction(
    fetched: FetchedTransaction,
    account_id: AccountId,
    account_type: &str,
) -> NewTransaction {
    NewTransaction {
        account_id,
        external_id: fetched.external_id,
        amount: normalized_amount(account_type, fetched.amount),
        description: fetched.description,
        merchant: fetched.merchant,
        category: fetched.category,
        date: fetched.date,
        status: fetched.status,
        transaction_type: fetched.transaction_type,
    }
}

/// Parse an aggregator date string, tolerating a trailing time component.
/// Unparseable or missing dates fall back to today.
fn parse_date(raw: Option<&str>) -> Date {
    raw.map(|text| text.get(..10).unwrap_or(text))
        .and_then(|text| Date::parse(text, DATE_FORMAT).ok())
        .unwrap_or_else(|| OffsetDateTime::now_utc().date())
}

pub fn map_teller_account(account: TellerAccount) -> NewAccount {
    NewAccount {
        external_id: account.id,
        name: account.name.unwrap_or_else(|| DEFAULT_ACCOUNT_NAME.to_owned()),
        account_type: account
            .account_type
            .map(|account_type| account_type.to_lowercase())
            .unwrap_or_else(|| DEFAULT_ACCOUNT_TYPE.to_owned()),
        balance_current: 0.0,
        balance_available: 0.0,
        last_four: account.last_four,
        institution_name: account
            .institution
            .and_then(|institution| institution.name)
            .unwrap_or_else(|| DEFAULT_INSTITUTION_NAME.to_owned()),
    }
}

pub fn map_teller_transaction(transaction: TellerTransaction) -> FetchedTransaction {
    let merchant = transaction
        .counterparty
        .and_then(|counterparty| counterparty.name);

    FetchedTransaction {
        external_id: transaction.id,
        amount: transaction.amount.unwrap_or(0.0),
        description: transaction
            .description
            .or_else(|| merchant.clone())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
        merchant,
        category: transaction
            .details
            .and_then(|details| details.category)
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
        date: parse_date(
            transaction
                .posted_at
                .or(transaction.created_at)
                .as_deref(),
        ),
        status: transaction
            .status
            .unwrap_or_else(|| DEFAULT_STATUS.to_owned()),
        transaction_type: transaction
            .transaction_type
            .unwrap_or_else(|| DEFAULT_TRANSACTION_TYPE.to_owned()),
    }
}

pub fn map_plaid_account(account: PlaidAccount) -> NewAccount {
    let balances = account.balances.unwrap_or(super::wire::PlaidBalances {
        current: None,
        available: None,
    });

    NewAccount {
        external_id: account.account_id,
        name: account
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_ACCOUNT_NAME.to_owned()),
        account_type: account
            .account_type
            .map(|account_type| account_type.to_lowercase())
            .unwrap_or_else(|| DEFAULT_ACCOUNT_TYPE.to_owned()),
        balance_current: balances.current.unwrap_or(0.0),
        balance_available: balances.available.unwrap_or(0.0),
        last_four: account.mask,
        institution_name: account
            .official_name
            .or(account.name)
            .unwrap_or_else(|| DEFAULT_INSTITUTION_NAME.to_owned()),
    }
}

pub fn map_plaid_transaction(transaction: PlaidTransaction) -> FetchedTransaction {
    FetchedTransaction {
        external_id: transaction.transaction_id,
        amount: transaction.amount.unwrap_or(0.0),
        description: transaction
            .name
            .clone()
            .or_else(|| transaction.merchant_name.clone())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
        merchant: transaction.merchant_name,
        category: transaction
            .category
            .filter(|categories| !categories.is_empty())
            .map(|categories| categories.join(", "))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
        date: parse_date(transaction.date.as_deref()),
        status: if transaction.pending {
            "pending".to_owned()
        } else {
            DEFAULT_STATUS.to_owned()
        },
        // Plaid reports no debit/credit marker; in its native sign convention
        // a positive amount is money out.
        transaction_type: if transaction.amount.unwrap_or(0.0) < 0.0 {
            "credit".to_owned()
        } else {
            DEFAULT_TRANSACTION_TYPE.to_owned()
        },
    }
}




#[cfg(test)]
mod map_plaid_tests {
    use time::macros::date;

    use crate::aggregator::wire::{PlaidAccount, PlaidTransaction};

    use super::{map_plaid_account, map_plaid_transaction};

    #[test]
    fn plaid_account_maps_inline_balances() {
        let account: PlaidAccount = serde_json::from_str(
            r#"{
                "account_id": "plaid_acc_1",
                "name": "Plaid Checking",
                "official_name": "Plaid Gold Standard Checking",
                "type": "depository",
                "mask": "0000",
                "balances": {"current": 110.0, "available": 100.0}
            }"#,
        )
        .unwrap();

        let mapped = map_plaid_account(account);

        assert_eq!(mapped.external_id, "plaid_acc_1");
        assert_eq!(mapped.balance_current, 110.0);
        assert_eq!(mapped.balance_available, 100.0);
        assert_eq!(mapped.institution_name, "Plaid Gold Standard Checking");
    }

    #[test]
    fn plaid_account_without_type_defaults_to_depository() {
        let account: PlaidAccount =
            serde_json::from_str(r#"{"account_id": "plaid_acc_1"}"#).unwrap();

        let mapped = map_plaid_account(account);

        assert_eq!(mapped.account_type, "depository");
        assert_eq!(mapped.balance_current, 0.0);
    }

    #[test]
    fn plaid_transaction_joins_category_list() {
        let transaction: PlaidTransaction = serde_json::from_str(
            r#"{
                "transaction_id": "plaid_txn_1",
                "account_id": "plaid_acc_1",
                "amount": 12.0,
                "name": "SparkFun",
                "date": "2025-05-20",
                "category": ["Shops", "Computers and Electronics"]
            }"#,
        )
        .unwrap();

        let mapped = map_plaid_transaction(transaction);

        assert_eq!(mapped.category, "Shops, Computers and Electronics");
        assert_eq!(mapped.date, date!(2025 - 05 - 20));
        assert_eq!(mapped.status, "posted");
        assert_eq!(mapped.transaction_type, "debit");
    }

    #[test]
    fn negative_plaid_amount_is_a_credit() {
        let transaction: PlaidTransaction = serde_json::from_str(
            r#"{"transaction_id": "plaid_txn_1", "account_id": "plaid_acc_1", "amount": -25.0}"#,
        )
        .unwrap();

        let mapped = map_plaid_transaction(transaction);

        assert_eq!(mapped.transaction_type, "credit");
    }

    #[test]
    fn pending_plaid_transaction_is_marked_pending() {
        let transaction: PlaidTransaction = serde_json::from_str(
            r#"{"transaction_id": "plaid_txn_1", "account_id": "plaid_acc_1", "pending": true}"#,
        )
        .unwrap();

        let mapped = map_plaid_transaction(transaction);

        assert_eq!(mapped.status, "pending");
    }
}
