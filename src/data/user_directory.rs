use crate::domain::email::Email;
use crate::domain::repository::UserDirectory;
use crate::domain::user::{User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// User directory backed by a map, for tests and local runs without the
/// user service.
#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    storage: Arc<RwLock<HashMap<String, User>>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, user_id: UserId, email: &str) -> User {
        let user = User {
            user_id,
            email: Some(email.to_string()),
        };
        let mut storage = self.storage.write().await;
        storage.insert(email.to_string(), user.clone());
        debug!(user_id = %user.user_id, email = email, "User registered in directory");
        user
    }

    /// Number of resolve calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    #[instrument(skip(self), fields(email = %email))]
    async fn resolve_user_by_email(&self, email: &Email) -> Option<User> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        trace!("Acquiring read lock for user directory");
        let storage = self.storage.read().await;
        let user = storage.get(email.as_str()).cloned();
        match &user {
            Some(u) => debug!(user_id = %u.user_id, "User found in directory"),
            None => trace!("User not found in directory"),
        }
        user
    }
}
