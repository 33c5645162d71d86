use crate::domain::account_id::generate_account_id;
use crate::domain::email::Email;
use crate::domain::error::DomainError;
use crate::domain::models::{Account, AccountSummary, InsertOutcome};
use crate::domain::repository::{AccountRepository, UserDirectory};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    users: Arc<dyn UserDirectory>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { accounts, users }
    }

    #[instrument(skip(self), fields(email = %email))]
    pub async fn get_account(&self, email: &Email) -> Result<AccountSummary> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(DomainError::AccountNotFound)?;
        Ok(account.into())
    }

    #[instrument(skip(self), fields(email = %email))]
    pub async fn create_account(&self, email: &Email) -> Result<Account> {
        let user = self
            .users
            .resolve_user_by_email(email)
            .await
            .ok_or(DomainError::EmailNotFound)?;

        let account_id = generate_account_id();
        match self.accounts.insert_account(&user.user_id, account_id).await? {
            InsertOutcome::Created(account) => {
                info!(
                    user_id = %account.user_id,
                    account_id = %account.account_id,
                    "Account issued"
                );
                Ok(account)
            }
            InsertOutcome::AlreadyExists => {
                warn!(user_id = %user.user_id, "Account already exists");
                Err(DomainError::AccountAlreadyExists.into())
            }
        }
    }

    /// Removes the user's accounts. Succeeds even when nothing was removed.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn delete_account(&self, email: &Email) -> Result<u64> {
        let user = self
            .users
            .resolve_user_by_email(email)
            .await
            .ok_or(DomainError::EmailNotFound)?;

        let removed = self.accounts.delete_by_user(&user.user_id).await?;
        info!(user_id = %user.user_id, removed, "Accounts deleted");
        Ok(removed)
    }
}
