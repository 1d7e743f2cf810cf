//! Date-driven fee classification.
//!
//! Classification is derived on read and never stored. Exactly one of the
//! three buckets applies to any challan on any given day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::ChallanStatus;

use super::models::Challan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeClassification {
    /// Unpaid and the due date has not passed yet
    Unpaid,
    /// Unpaid and strictly past the due date
    Defaulter,
    Paid,
}

pub fn classify(challan: &Challan, today: NaiveDate) -> FeeClassification {
    match challan.status {
        ChallanStatus::Paid => FeeClassification::Paid,
        ChallanStatus::Unpaid if today > challan.due_date => FeeClassification::Defaulter,
        ChallanStatus::Unpaid => FeeClassification::Unpaid,
    }
}
