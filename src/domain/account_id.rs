use serde::{Deserialize, Serialize};
use std::fmt;

const ACCOUNT_ID_PREFIX: &str = "2000";

/// Account number of the form `2000-DDD-DDDD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Self {
        AccountId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the id has the `2000-ddd-dddd` shape.
    pub fn is_well_formed(&self) -> bool {
        let mut parts = self.0.split('-');
        let (Some(prefix), Some(middle), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        prefix == ACCOUNT_ID_PREFIX
            && middle.len() == 3
            && suffix.len() == 4
            && middle.bytes().all(|b| b.is_ascii_digit())
            && suffix.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draws a fresh account id. Uniqueness against stored ids is not checked.
pub fn generate_account_id() -> AccountId {
    let middle = fastrand::u16(100..=999);
    let suffix = fastrand::u16(1000..=9999);
    AccountId(format!("{ACCOUNT_ID_PREFIX}-{middle:03}-{suffix:04}"))
}
