//! Read-side report rows. None of these are stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{ChallanStatus, ClassLevel};
use std::collections::BTreeMap;

use super::challan::ChallanId;
use super::student::{Student, StudentId};
use crate::domain::classification::FeeClassification;

/// Reports grouped by class iterate in CLASS_LIST order.
pub type ByClass<T> = BTreeMap<ClassLevel, Vec<T>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSummaryRow {
    pub student_id: StudentId,
    pub full_name: String,
    pub class: ClassLevel,
    pub contact_details: String,
    pub total_due: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaulterEntry {
    pub student_id: StudentId,
    pub full_name: String,
    pub total_due: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingEntry {
    pub full_name: String,
    pub challan_id: ChallanId,
    pub payment_date: NaiveDate,
    pub total_amount: f64,
    pub arrears: f64,
    pub fine: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDay {
    pub payment_date: NaiveDate,
    pub count: usize,
    pub total_collected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_pending: f64,
    pub total_collected: f64,
    pub defaulters: Vec<FeeSummaryRow>,
    pub clear_accounts: Vec<FeeSummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassChallanRow {
    pub student_id: StudentId,
    pub full_name: String,
    pub challan_id: ChallanId,
    pub due_date: NaiveDate,
    pub total_amount: f64,
    pub status: ChallanStatus,
    pub classification: FeeClassification,
}

/// Everything the class fee screen shows for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassFeeView {
    pub class: ClassLevel,
    pub students: Vec<Student>,
    pub unpaid: Vec<ClassChallanRow>,
    pub defaulters: Vec<ClassChallanRow>,
    pub paid: Vec<ClassChallanRow>,
}
