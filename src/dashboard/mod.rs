//! The dashboard read path: aggregate summaries over synced records.

mod core;
mod endpoint;

pub use core::{credit_available, credit_used, total_debt, total_depository_balance};
pub use endpoint::{DashboardResponse, get_dashboard_endpoint};
