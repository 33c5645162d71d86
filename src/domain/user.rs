use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier assigned by the user service. Carried as text whether the
/// upstream sends it as a JSON string or a JSON integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        UserId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawUserId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawUserId::deserialize(deserializer)? {
            RawUserId::Text(s) => UserId(s),
            RawUserId::Signed(n) => UserId(n.to_string()),
            RawUserId::Unsigned(n) => UserId(n.to_string()),
        })
    }
}

/// User record as returned by the user service. Fields other than these are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveUserRequest<'a> {
    pub email: &'a str,
}
