//! Domain layer - Pure business types
//!
//! This layer contains NO framework dependencies (no SeaORM).
//! Only data records, input validation and domain error types.

pub mod errors;
pub mod records;
pub mod validation;

pub use errors::DomainError;
pub use records::*;
