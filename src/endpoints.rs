//! Path constants for the API routes.
//!
//! Axum 0.8 uses `{param}` syntax for path parameters.

/// Attempt to get coffee from the server. Unprotected healthcheck.
pub const COFFEE: &str = "/api/coffee";

/// Register an enrollment credential and run the initial sync.
pub const ENROLLMENTS: &str = "/api/enrollments";

/// Exchange a public token for an access credential and run the initial sync.
pub const EXCHANGE_TOKEN: &str = "/api/tokens/exchange";

/// Create an aggregator link token bound to the caller.
pub const LINK_TOKEN: &str = "/api/tokens/link";

/// Re-sync transactions for specific accounts.
pub const SYNC_TRANSACTIONS: &str = "/api/transactions/sync";

/// The dashboard summary.
pub const DASHBOARD: &str = "/api/dashboard";

/// The caller's accounts with branding.
pub const ACCOUNTS: &str = "/api/accounts";

/// Delete one account and its transactions.
pub const DELETE_ACCOUNT: &str = "/api/accounts/{account_id}";
