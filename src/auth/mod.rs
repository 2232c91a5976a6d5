//! Session validation for requests authenticated by the hosted auth provider.
//!
//! This server never issues sessions; it only checks that the bearer token on
//! a request maps to an unexpired session row.

mod middleware;
pub mod session;

pub use middleware::{AuthState, auth_guard};
pub use session::{create_session_table, get_session_user, hash_session_token, insert_session};
