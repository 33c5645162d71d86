use crate::domain::account_id::AccountId;
use crate::domain::email::Email;
use crate::domain::models::{Account, Balance, InsertOutcome};
use crate::domain::repository::AccountRepository;
use crate::domain::user::UserId;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::{debug, info, instrument, warn};

const FIND_BY_EMAIL: &str = "SELECT Accounts.account_id, \
     CAST(Accounts.balance AS UNSIGNED) AS balance, \
     CAST(Accounts.user_id AS CHAR) AS user_id \
     FROM Users INNER JOIN Accounts ON Users.user_id = Accounts.user_id \
     WHERE Users.email = ? LIMIT 1";

const EXISTS_FOR_USER: &str = "SELECT 1 FROM Accounts WHERE user_id = ? LIMIT 1";

// Check and insert in one statement; zero affected rows means the user
// already holds an account.
const INSERT_IF_ABSENT: &str = "INSERT INTO Accounts (user_id, account_id, balance) \
     SELECT ?, ?, 0 FROM DUAL \
     WHERE NOT EXISTS (SELECT 1 FROM Accounts WHERE user_id = ?)";

// SQLSTATE for ER_LOCK_DEADLOCK and other serialization failures.
const SERIALIZATION_FAILURE: &str = "40001";

const MAX_INSERT_ATTEMPTS: u32 = 3;

const DELETE_BY_USER: &str = "DELETE FROM Accounts WHERE user_id = ?";

/// `Users`/`Accounts` tables on MySQL through a sqlx pool.
#[derive(Clone)]
pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn connect(options: MySqlConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to MySQL")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Round-trips a trivial statement to prove the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("MySQL ping failed")?;
        Ok(())
    }

    async fn has_account(&self, user_id: &UserId) -> Result<bool> {
        let row = sqlx::query(EXISTS_FOR_USER)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check for an existing account")?;
        Ok(row.is_some())
    }
}

fn row_to_account(row: &MySqlRow) -> Result<Account> {
    let account_id: String = row.try_get("account_id")?;
    let balance: u64 = row.try_get("balance")?;
    let user_id: String = row.try_get("user_id")?;
    Ok(Account {
        account_id: AccountId::new(account_id),
        user_id: UserId::new(user_id),
        balance: Balance::new(balance),
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn is_serialization_failure(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| is_serialization_sqlstate(&code))
}

fn is_serialization_sqlstate(code: &str) -> bool {
    code == SERIALIZATION_FAILURE
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    #[instrument(skip(self), fields(email = %email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>> {
        let row = sqlx::query(FIND_BY_EMAIL)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query account by email")?;
        let account = row.as_ref().map(row_to_account).transpose()?;
        debug!(found = account.is_some(), "Account lookup by email finished");
        Ok(account)
    }

    #[instrument(skip(self), fields(user_id = %user_id, account_id = %account_id))]
    async fn insert_account(
        &self,
        user_id: &UserId,
        account_id: AccountId,
    ) -> Result<InsertOutcome> {
        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let inserted = sqlx::query(INSERT_IF_ABSENT)
                .bind(user_id.as_str())
                .bind(account_id.as_str())
                .bind(user_id.as_str())
                .execute(&self.pool)
                .await;
            match inserted {
                Ok(result) if result.rows_affected() == 0 => {
                    debug!("User already holds an account");
                    return Ok(InsertOutcome::AlreadyExists);
                }
                Ok(_) => break,
                Err(e) if is_unique_violation(&e) => {
                    warn!(error = %e, "Concurrent insert hit the unique key");
                    return Ok(InsertOutcome::AlreadyExists);
                }
                Err(e) if is_serialization_failure(&e) => {
                    warn!(attempt, error = %e, "Insert lost a lock race, re-checking");
                    if self.has_account(user_id).await? {
                        return Ok(InsertOutcome::AlreadyExists);
                    }
                    if attempt == MAX_INSERT_ATTEMPTS {
                        return Err(e).context("Account insert kept deadlocking");
                    }
                }
                Err(e) => return Err(e).context("Failed to insert account"),
            }
        }

        info!("Account row inserted");
        Ok(InsertOutcome::Created(Account {
            account_id,
            user_id: user_id.clone(),
            balance: Balance::ZERO,
        }))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete_by_user(&self, user_id: &UserId) -> Result<u64> {
        let result = sqlx::query(DELETE_BY_USER)
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .context("Failed to delete accounts")?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlock_sqlstate_is_retried() {
        assert!(is_serialization_sqlstate("40001"));
    }

    #[test]
    fn test_other_sqlstates_are_not_retried() {
        for code in ["23000", "HY000", "42S02", ""] {
            assert!(!is_serialization_sqlstate(code), "{code:?}");
        }
    }
}
