//! Error taxonomy for ledger operations.

use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("challan {0} is already paid")]
    AlreadyPaid(i64),
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn student_not_found(id: i64) -> Self {
        LedgerError::NotFound {
            entity: "student",
            id,
        }
    }

    pub fn challan_not_found(id: i64) -> Self {
        LedgerError::NotFound {
            entity: "challan",
            id,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StorageError>() {
            Some(StorageError::Conflict(message)) => {
                LedgerError::ConstraintViolation(message.clone())
            }
            _ => LedgerError::Storage(err),
        }
    }
}
