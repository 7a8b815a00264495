//! Repository implementations over the storage contract
//!
//! The repositories own all query text and all row-to-record mapping. The
//! UI never sees any of this, it only talks to the service layer.

pub mod modul_belegung_repository;
pub mod modul_repository;
pub mod student_repository;
pub mod studiengang_repository;

pub use modul_belegung_repository::ModulBelegungRepository;
pub use modul_repository::ModulRepository;
pub use student_repository::StudentRepository;
pub use studiengang_repository::StudiengangRepository;

use chrono::NaiveDate;

use crate::domain::DomainError;

/// Dates live in the store as TEXT in `YYYY-MM-DD`; `None` as NULL.
pub(crate) fn iso(d: Option<NaiveDate>) -> Option<String> {
    d.map(|d| d.format("%Y-%m-%d").to_string())
}

pub(crate) fn date_from_iso(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DomainError::Database(format!("invalid date '{}' in store: {}", s, e)))
}

pub(crate) fn opt_date_from_iso(s: Option<String>) -> Result<Option<NaiveDate>, DomainError> {
    s.as_deref().map(date_from_iso).transpose()
}
