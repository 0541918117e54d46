use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a monitored trading account.
/// e.g. "demo", "paper-1", "ira-longterm"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cash side of an account, read from the position store at assessment time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    pub account_id: AccountId,
    pub cash_balance: f64,
}

impl AccountState {
    pub fn new(account_id: AccountId, cash_balance: f64) -> Self {
        Self {
            account_id,
            cash_balance,
        }
    }
}
