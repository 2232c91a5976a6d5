//! The user ID type that scopes every persistence call to its owner.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A newtype wrapper for the opaque user identifier issued by the hosted auth
/// provider.
///
/// User records themselves live with the auth provider; this server only ever
/// sees the identifier. Wrapping it disambiguates user IDs from the other
/// string-typed identifiers (aggregator account IDs, item IDs) that flow
/// through the sync code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
