use crate::domain::account_id::AccountId;
use crate::domain::user::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Account {
    pub account_id: AccountId,
    pub user_id: UserId,
    pub balance: Balance,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Balance(u64);

impl Balance {
    pub const ZERO: Balance = Balance(0);

    pub fn new(value: u64) -> Self {
        Balance(value)
    }

    pub fn inner(&self) -> u64 {
        self.0
    }
}

/// Body shared by the create, delete and get endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: Option<serde_json::Value>,
}

/// Balance view returned by get_account.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub balance: Balance,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        AccountSummary {
            account_id: account.account_id,
            balance: account.balance,
        }
    }
}

/// Outcome of an insert attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Created(Account),
    AlreadyExists,
}
