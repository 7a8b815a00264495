//! Parsing/validation for UI input.
//!
//! The UI hands everything over as text. These functions turn strings into
//! typed values (int/float/date) and run simple plausibility checks so that
//! broken values never reach the repositories. All failures are
//! [`DomainError::Validation`] with a message that can be shown as-is.

use chrono::NaiveDate;

use super::DomainError;

/// Parses a date from the input notations users actually type.
///
/// Accepted, tried in order: `YYYY-MM-DD`, `DD.MM.YY`, `DD.MM.YYYY`.
/// Empty (or whitespace-only) input means "no date" and yields `None`.
/// Two-digit years land in chrono's `%y` window: 00-68 become 20xx,
/// 69-99 become 19xx.
pub fn parse_date(text: &str) -> Result<Option<NaiveDate>, DomainError> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(None);
    }
    for fmt in ["%Y-%m-%d", "%d.%m.%y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Ok(Some(d));
        }
    }
    Err(DomainError::Validation(
        "Datum muss YYYY-MM-DD oder DD.MM.YY(YY) sein".to_string(),
    ))
}

/// Parses an integer, optionally enforcing a minimum.
pub fn parse_int(text: &str, field: &str, min_value: Option<i32>) -> Result<i32, DomainError> {
    let v: i32 = text
        .trim()
        .parse()
        .map_err(|_| DomainError::Validation(format!("{} muss eine ganze Zahl sein", field)))?;
    if let Some(min) = min_value {
        if v < min {
            return Err(DomainError::Validation(format!(
                "{} muss >= {} sein",
                field, min
            )));
        }
    }
    Ok(v)
}

/// Parses a decimal number; both `.` and `,` work as decimal separator.
pub fn parse_float(
    text: &str,
    field: &str,
    min_value: Option<f64>,
    max_value: Option<f64>,
) -> Result<f64, DomainError> {
    let v: f64 = text
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| DomainError::Validation(format!("{} muss eine Zahl sein", field)))?;
    if let Some(min) = min_value {
        if v < min {
            return Err(DomainError::Validation(format!(
                "{} muss >= {} sein",
                field, min
            )));
        }
    }
    if let Some(max) = max_value {
        if v > max {
            return Err(DomainError::Validation(format!(
                "{} muss <= {} sein",
                field, max
            )));
        }
    }
    Ok(v)
}

/// Like [`parse_int`], but empty input yields `None` (optional fields such
/// as the actual semester).
pub fn parse_optional_int(
    text: &str,
    field: &str,
    min_value: Option<i32>,
) -> Result<Option<i32>, DomainError> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(None);
    }
    parse_int(t, field, min_value).map(Some)
}

/// Like [`parse_float`], but empty input yields `None` (target/actual
/// grades).
pub fn parse_optional_float(
    text: &str,
    field: &str,
    min_value: Option<f64>,
    max_value: Option<f64>,
) -> Result<Option<f64>, DomainError> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(None);
    }
    parse_float(t, field, min_value, max_value).map(Some)
}

/// Grades live on the German 1.0..=5.0 scale; `None` means "not graded yet"
/// and passes.
pub fn validate_grade(grade: Option<f64>) -> Result<(), DomainError> {
    match grade {
        None => Ok(()),
        Some(g) if (1.0..=5.0).contains(&g) => Ok(()),
        Some(_) => Err(DomainError::Validation(
            "Note muss zwischen 1.0 und 5.0 liegen".to_string(),
        )),
    }
}

/// An enrollment records at least one attempt.
pub fn validate_attempts(attempts: i32) -> Result<(), DomainError> {
    if attempts < 1 {
        return Err(DomainError::Validation(
            "Anzahl Versuche muss >= 1 sein".to_string(),
        ));
    }
    Ok(())
}
