use crate::application::service::AccountService;
use crate::domain::error::DomainError;
use crate::domain::models::Balance;
use crate::presentation::extract::ValidatedEmail;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub const SERVICE_NAME: &str = "account";
pub const ACCOUNT_ISSUED_MSG: &str = "Account issuance has been completed.";
pub const ACCOUNT_DELETED_MSG: &str = "Account deletion has been completed.";
const INTERNAL_ERROR_MSG: &str = "Internal server error";

pub struct AppState {
    pub service: AccountService,
}

// Uniform error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Email not found")]
    EmailNotFound,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Account already exists")]
    AccountAlreadyExists,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidEmail => StatusCode::BAD_REQUEST,
            ApiError::EmailNotFound => StatusCode::NOT_FOUND,
            ApiError::AccountNotFound => StatusCode::NOT_FOUND,
            ApiError::AccountAlreadyExists => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Internal details stay in the log
        let message = match self {
            ApiError::Internal(detail) => {
                error!(error = %detail, status = %status, "Database error");
                INTERNAL_ERROR_MSG.to_string()
            }
            other => {
                warn!(error = %other, status = %status, "Request rejected");
                other.to_string()
            }
        };

        HttpResponse::build(status).json(ErrorResponse { error: message })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidEmail => ApiError::InvalidEmail,
            DomainError::EmailNotFound => ApiError::EmailNotFound,
            DomainError::AccountNotFound => ApiError::AccountNotFound,
            DomainError::AccountAlreadyExists => ApiError::AccountAlreadyExists,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(domain) => domain.clone().into(),
            None => ApiError::Internal(format!("{err:#}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub msg: String,
    pub service: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    pub msg: String,
    pub account_id: String,
    pub balance: Balance,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

#[instrument]
pub async fn healthcheck() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        msg: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, email), fields(email = %email.0, account_id))]
pub async fn create_account(
    state: web::Data<AppState>,
    email: ValidatedEmail,
) -> Result<HttpResponse, ApiError> {
    let email = email.into_inner();
    info!("Creating new account");
    let account = state.service.create_account(&email).await?;
    tracing::Span::current().record("account_id", account.account_id.as_str());
    Ok(HttpResponse::Ok().json(CreateAccountResponse {
        msg: ACCOUNT_ISSUED_MSG.to_string(),
        account_id: account.account_id.into_inner(),
        balance: account.balance,
    }))
}

#[instrument(skip(state, email), fields(email = %email.0))]
pub async fn delete_account(
    state: web::Data<AppState>,
    email: ValidatedEmail,
) -> Result<HttpResponse, ApiError> {
    let email = email.into_inner();
    info!("Deleting account");
    state.service.delete_account(&email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        msg: ACCOUNT_DELETED_MSG.to_string(),
    }))
}

#[instrument(skip(state, email), fields(email = %email.0))]
pub async fn get_account(
    state: web::Data<AppState>,
    email: ValidatedEmail,
) -> Result<HttpResponse, ApiError> {
    let email = email.into_inner();
    info!("Getting account balance");
    let summary = state.service.get_account(&email).await?;
    info!(
        account_id = %summary.account_id,
        balance = summary.balance.inner(),
        "Account retrieved successfully"
    );
    Ok(HttpResponse::Ok().json(summary))
}

/// Mounts the account routes under `/v1/account`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/account")
            .route("/healthcheck", web::get().to(healthcheck))
            .route("/create_account", web::post().to(create_account))
            .route("/delete_account", web::delete().to(delete_account))
            .route("/get_account", web::post().to(get_account)),
    );
}
