//! # SQLite Storage
//!
//! sqlx-backed repositories over the `students`, `challans` and
//! `challan_items` tables. Foreign keys are switched on for every pooled
//! connection so student deletion cascades through challans to items.

pub mod challan_repository;
pub mod connection;
pub mod student_repository;

pub use challan_repository::ChallanRepository;
pub use connection::DbConnection;
pub use student_repository::StudentRepository;

use chrono::NaiveDate;

use super::StorageError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(column: &'static str, value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        StorageError::Corrupt {
            column,
            value: value.to_string(),
        }
        .into()
    })
}

/// Blank legacy values read as absent.
pub(crate) fn parse_optional_date(
    column: &'static str,
    value: Option<String>,
) -> anyhow::Result<Option<NaiveDate>> {
    match value {
        Some(text) if !text.trim().is_empty() => parse_date(column, &text).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn parse_literal<T: std::str::FromStr>(
    column: &'static str,
    value: &str,
) -> anyhow::Result<T> {
    value.parse::<T>().map_err(|_| {
        StorageError::Corrupt {
            column,
            value: value.to_string(),
        }
        .into()
    })
}

/// Surface constraint failures as [`StorageError::Conflict`].
pub(crate) fn map_write_error(err: sqlx::Error) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() || db_err.is_unique_violation() {
            return StorageError::Conflict(db_err.message().to_string()).into();
        }
    }
    err.into()
}
