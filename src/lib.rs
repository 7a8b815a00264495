pub mod config;
pub mod db;
pub mod domain;
pub mod infrastructure;

pub use db::{Storage, SqliteStorage};
pub use domain::DomainError;
pub use infrastructure::AppState;
