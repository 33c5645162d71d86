use crate::domain::account_id::AccountId;
use crate::domain::email::Email;
use crate::domain::models::{Account, Balance, InsertOutcome};
use crate::domain::repository::AccountRepository;
use crate::domain::user::UserId;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Default)]
struct Tables {
    // email -> user_id, mirrors the `Users` table
    users: HashMap<String, UserId>,
    accounts: Vec<Account>,
}

/// In-memory stand-in for the `Users`/`Accounts` tables.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    storage: Arc<RwLock<Tables>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a row in the local `Users` table.
    pub async fn add_user(&self, user_id: UserId, email: &str) {
        let mut storage = self.storage.write().await;
        storage.users.insert(email.to_string(), user_id);
    }

    pub async fn accounts_of(&self, user_id: &UserId) -> Vec<Account> {
        let storage = self.storage.read().await;
        storage
            .accounts
            .iter()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip(self), fields(email = %email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>> {
        trace!("Acquiring read lock for account storage");
        let storage = self.storage.read().await;
        let account = storage.users.get(email.as_str()).and_then(|user_id| {
            storage
                .accounts
                .iter()
                .find(|a| &a.user_id == user_id)
                .cloned()
        });
        debug!(found = account.is_some(), "Account lookup by email finished");
        Ok(account)
    }

    #[instrument(skip(self), fields(user_id = %user_id, account_id = %account_id))]
    async fn insert_account(
        &self,
        user_id: &UserId,
        account_id: AccountId,
    ) -> Result<InsertOutcome> {
        trace!("Acquiring write lock for account storage");
        let mut storage = self.storage.write().await;
        if storage.accounts.iter().any(|a| &a.user_id == user_id) {
            debug!("User already holds an account");
            return Ok(InsertOutcome::AlreadyExists);
        }
        let account = Account {
            account_id,
            user_id: user_id.clone(),
            balance: Balance::ZERO,
        };
        storage.accounts.push(account.clone());
        debug!("Account saved to memory storage");
        Ok(InsertOutcome::Created(account))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete_by_user(&self, user_id: &UserId) -> Result<u64> {
        trace!("Acquiring write lock for account storage");
        let mut storage = self.storage.write().await;
        let before = storage.accounts.len();
        storage.accounts.retain(|a| &a.user_id != user_id);
        let removed = (before - storage.accounts.len()) as u64;
        debug!(removed, "Accounts removed from memory storage");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_find_by_email() {
        let repo = InMemoryAccountRepository::new();
        let user_id = UserId::new("7");
        repo.add_user(user_id.clone(), "alice@example.com").await;

        let outcome = repo
            .insert_account(&user_id, AccountId::new("2000-123-4567"))
            .await
            .unwrap();
        assert!(matches!(outcome, InsertOutcome::Created(_)));

        let found = repo
            .find_by_email(&email("alice@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.account_id.as_str(), "2000-123-4567");
        assert_eq!(found.balance, Balance::ZERO);
    }

    #[tokio::test]
    async fn test_find_by_email_without_account_returns_none() {
        let repo = InMemoryAccountRepository::new();
        repo.add_user(UserId::new("7"), "alice@example.com").await;

        assert!(repo.find_by_email(&email("alice@example.com")).await.unwrap().is_none());
        assert!(repo.find_by_email(&email("ghost@example.com")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_insert_for_same_user_is_rejected() {
        let repo = InMemoryAccountRepository::new();
        let user_id = UserId::new("7");

        repo.insert_account(&user_id, AccountId::new("2000-111-1111"))
            .await
            .unwrap();
        let outcome = repo
            .insert_account(&user_id, AccountId::new("2000-222-2222"))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::AlreadyExists);
        assert_eq!(repo.accounts_of(&user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_user_is_idempotent() {
        let repo = InMemoryAccountRepository::new();
        let user_id = UserId::new("7");
        repo.insert_account(&user_id, AccountId::new("2000-111-1111"))
            .await
            .unwrap();

        assert_eq!(repo.delete_by_user(&user_id).await.unwrap(), 1);
        assert_eq!(repo.delete_by_user(&user_id).await.unwrap(), 0);
        assert!(repo.accounts_of(&user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_keep_one_account_per_user() {
        let repo = InMemoryAccountRepository::new();
        let user_id = UserId::new("9");

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo_clone = repo.clone();
                let user_id = user_id.clone();
                tokio::spawn(async move {
                    repo_clone
                        .insert_account(&user_id, AccountId::new(format!("2000-100-{}", 1000 + i)))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if let InsertOutcome::Created(_) = handle.await.unwrap().unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repo.accounts_of(&user_id).await.len(), 1);
    }
}
