use crate::domain::email::Email;
use crate::domain::models::EmailRequest;
use crate::presentation::handlers::ApiError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use serde_json::Value;
use std::pin::Pin;
use tracing::warn;

/// Email taken from the JSON body and checked against the address pattern.
/// A missing body, missing field, non-string value or malformed address is
/// rejected with 400 before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidatedEmail(pub Email);

impl ValidatedEmail {
    pub fn into_inner(self) -> Email {
        self.0
    }
}

impl FromRequest for ValidatedEmail {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<EmailRequest>::from_request(req, payload);
        Box::pin(async move {
            let raw = match body.await {
                Ok(body) => body.into_inner().email,
                Err(e) => {
                    warn!(error = %e, "Unreadable request body");
                    None
                }
            };

            match raw {
                Some(Value::String(candidate)) => match Email::parse(&candidate) {
                    Ok(email) => Ok(ValidatedEmail(email)),
                    Err(e) => {
                        warn!(email = %candidate, "Invalid email format");
                        Err(e.into())
                    }
                },
                other => {
                    warn!(email = ?other, "Invalid email format");
                    Err(ApiError::InvalidEmail)
                }
            }
        })
    }
}
