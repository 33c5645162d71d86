pub mod account_id;
pub mod email;
pub mod error;
pub mod models;
pub mod repository;
pub mod user;
