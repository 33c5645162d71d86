use crate::domain::account_id::AccountId;
use crate::domain::email::Email;
use crate::domain::models::{Account, InsertOutcome};
use crate::domain::user::{User, UserId};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Account of the user registered under `email`, joined through `user_id`.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>>;
    /// Inserts a zero-balance account unless the user already holds one.
    /// The check and the insert are atomic.
    async fn insert_account(
        &self,
        user_id: &UserId,
        account_id: AccountId,
    ) -> Result<InsertOutcome>;
    /// Removes every account of the user and returns how many were removed.
    async fn delete_by_user(&self, user_id: &UserId) -> Result<u64>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `None` covers both "unknown email" and any upstream failure.
    async fn resolve_user_by_email(&self, email: &Email) -> Option<User>;
}
