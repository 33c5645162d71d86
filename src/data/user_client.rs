use crate::domain::email::Email;
use crate::domain::repository::UserDirectory;
use crate::domain::user::{ResolveUserRequest, User};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, instrument};

pub const DEFAULT_USER_SERVICE_URL: &str =
    "http://user-service.default.svc.cluster.local/v1/user/get_user";

/// Resolves users through the user service's `get_user` endpoint.
pub struct HttpUserDirectory {
    client: Client,
    endpoint: String,
}

impl HttpUserDirectory {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[instrument(skip(self), fields(email = %email, endpoint = %self.endpoint))]
    async fn resolve_user_by_email(&self, email: &Email) -> Option<User> {
        let response = match self
            .client
            .post(&self.endpoint)
            .json(&ResolveUserRequest {
                email: email.as_str(),
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(email = %email, error = %e, "Failed to reach user service");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            error!(email = %email, status = status.as_u16(), "Failed to get user for email");
            return None;
        }

        match response.json::<User>().await {
            Ok(user) => {
                debug!(user_id = %user.user_id, "User resolved by user service");
                Some(user)
            }
            Err(e) => {
                error!(email = %email, error = %e, "Undecodable user service response");
                None
            }
        }
    }
}
