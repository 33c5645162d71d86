pub mod memory;
pub mod mysql;
pub mod user_client;
pub mod user_directory;
