//! Translation between the wire DTOs in `shared` and domain types.
//! Malformed input surfaces as `LedgerError::Validation`.

pub mod challan_mapper;
pub mod promotion_mapper;
pub mod student_mapper;

use chrono::NaiveDate;
use shared::ClassLevel;

use crate::domain::{LedgerError, LedgerResult};

const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` field
pub fn parse_date(field: &str, value: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), WIRE_DATE_FORMAT).map_err(|_| {
        LedgerError::validation(format!(
            "{} must be a YYYY-MM-DD date, got '{}'",
            field, value
        ))
    })
}

/// Absent or blank means no date
pub fn parse_optional_date(field: &str, value: Option<&str>) -> LedgerResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(text) => parse_date(field, text).map(Some),
        None => Ok(None),
    }
}

/// Like [`parse_optional_date`] but falls back to `default`
pub fn date_or(field: &str, value: Option<&str>, default: NaiveDate) -> LedgerResult<NaiveDate> {
    Ok(parse_optional_date(field, value)?.unwrap_or(default))
}

pub fn parse_class(value: &str) -> LedgerResult<ClassLevel> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation("class is required"));
    }
    value
        .parse()
        .map_err(|e: shared::ParseEnumError| LedgerError::validation(e.to_string()))
}
