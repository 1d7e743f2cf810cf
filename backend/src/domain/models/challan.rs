//! Domain model for fee vouchers (challans) and their line items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::ChallanStatus;

use super::student::StudentId;
use crate::domain::error::{LedgerError, LedgerResult};

pub type ChallanId = i64;

/// Offset added to a challan id to form the ten-digit number printed on
/// vouchers and quoted by the bank.
pub const CHALLAN_NUMBER_BASE: i64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeLine {
    pub description: String,
    pub amount: f64,
}

impl FeeLine {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// A validated challan awaiting insertion.
///
/// The total is computed once here and never recomputed; the stored
/// `total_amount` is this snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChallan {
    student_id: StudentId,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    items: Vec<FeeLine>,
    arrears: f64,
    fine: f64,
    total_amount: f64,
}

impl NewChallan {
    pub fn new(
        student_id: StudentId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        items: Vec<FeeLine>,
        arrears: f64,
        fine: f64,
    ) -> LedgerResult<Self> {
        validate_fee_lines(&items)?;
        check_amount("arrears", arrears)?;
        check_amount("fine", fine)?;
        if items.is_empty() && arrears == 0.0 && fine == 0.0 {
            return Err(LedgerError::validation(
                "a challan needs at least one item, arrears or fine",
            ));
        }

        let total_amount = items.iter().map(|item| item.amount).sum::<f64>() + arrears + fine;

        Ok(Self {
            student_id,
            issue_date,
            due_date,
            items,
            arrears,
            fine,
            total_amount,
        })
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn items(&self) -> &[FeeLine] {
        &self.items
    }

    pub fn arrears(&self) -> f64 {
        self.arrears
    }

    pub fn fine(&self) -> f64 {
        self.fine
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challan {
    pub id: ChallanId,
    pub student_id: StudentId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: ChallanStatus,
    pub payment_date: Option<NaiveDate>,
    pub total_amount: f64,
    pub arrears: f64,
    pub fine: f64,
}

impl Challan {
    pub fn is_paid(&self) -> bool {
        self.status == ChallanStatus::Paid
    }

    pub fn challan_number(&self) -> String {
        (CHALLAN_NUMBER_BASE + self.id).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallanWithItems {
    pub challan: Challan,
    pub items: Vec<FeeLine>,
}

impl ChallanWithItems {
    /// Stored items followed by "Arrears" and "Fine" pseudo-lines when
    /// non-zero. The pseudo-lines are display only and never persisted.
    pub fn display_lines(&self) -> Vec<FeeLine> {
        let mut lines = self.items.clone();
        if self.challan.arrears > 0.0 {
            lines.push(FeeLine::new("Arrears", self.challan.arrears));
        }
        if self.challan.fine > 0.0 {
            lines.push(FeeLine::new("Fine", self.challan.fine));
        }
        lines
    }
}

pub fn validate_fee_lines(items: &[FeeLine]) -> LedgerResult<()> {
    for item in items {
        if item.description.trim().is_empty() {
            return Err(LedgerError::validation("fee item description cannot be empty"));
        }
        check_amount(&item.description, item.amount)?;
    }
    Ok(())
}

fn check_amount(label: &str, amount: f64) -> LedgerResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(LedgerError::validation(format!(
            "{} amount must be a non-negative number, got {}",
            label, amount
        )));
    }
    Ok(())
}
