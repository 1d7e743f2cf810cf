//! Wire-level types shared between the ledger backend and any frontend.
//!
//! The enumerations here persist as exact string literals (`"Passed Out"`,
//! `"Unpaid"`, ...) so the same values round-trip through the database, the
//! JSON API and the printed vouchers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a persisted or user-supplied literal is not one of the
/// known enumeration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Grade levels offered by the school, in progression order (CLASS_LIST).
///
/// `Ord` follows declaration order, so sorting by class gives the order used
/// on printed class-wise reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassLevel {
    Playgroup,
    Nursery,
    Prep,
    #[serde(rename = "Grade 1")]
    Grade1,
    #[serde(rename = "Grade 2")]
    Grade2,
    #[serde(rename = "Grade 3")]
    Grade3,
    #[serde(rename = "Grade 4")]
    Grade4,
    #[serde(rename = "Grade 5")]
    Grade5,
    #[serde(rename = "Grade 6")]
    Grade6,
    #[serde(rename = "Grade 7")]
    Grade7,
    #[serde(rename = "Grade 8")]
    Grade8,
    #[serde(rename = "Grade 9")]
    Grade9,
    #[serde(rename = "Grade 10")]
    Grade10,
    #[serde(rename = "O-Level")]
    OLevel,
    #[serde(rename = "A-Level")]
    ALevel,
    Hifz,
    #[serde(rename = "Passed Out")]
    PassedOut,
}

impl ClassLevel {
    pub const ALL: [ClassLevel; 17] = [
        ClassLevel::Playgroup,
        ClassLevel::Nursery,
        ClassLevel::Prep,
        ClassLevel::Grade1,
        ClassLevel::Grade2,
        ClassLevel::Grade3,
        ClassLevel::Grade4,
        ClassLevel::Grade5,
        ClassLevel::Grade6,
        ClassLevel::Grade7,
        ClassLevel::Grade8,
        ClassLevel::Grade9,
        ClassLevel::Grade10,
        ClassLevel::OLevel,
        ClassLevel::ALevel,
        ClassLevel::Hifz,
        ClassLevel::PassedOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLevel::Playgroup => "Playgroup",
            ClassLevel::Nursery => "Nursery",
            ClassLevel::Prep => "Prep",
            ClassLevel::Grade1 => "Grade 1",
            ClassLevel::Grade2 => "Grade 2",
            ClassLevel::Grade3 => "Grade 3",
            ClassLevel::Grade4 => "Grade 4",
            ClassLevel::Grade5 => "Grade 5",
            ClassLevel::Grade6 => "Grade 6",
            ClassLevel::Grade7 => "Grade 7",
            ClassLevel::Grade8 => "Grade 8",
            ClassLevel::Grade9 => "Grade 9",
            ClassLevel::Grade10 => "Grade 10",
            ClassLevel::OLevel => "O-Level",
            ClassLevel::ALevel => "A-Level",
            ClassLevel::Hifz => "Hifz",
            ClassLevel::PassedOut => "Passed Out",
        }
    }
}

impl fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassLevel::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == s.trim())
            .ok_or_else(|| ParseEnumError::new("class", s))
    }
}

/// Enrollment status of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentStatus {
    Active,
    Inactive,
    Withdrawn,
    Graduated,
    #[serde(rename = "Passed Out")]
    PassedOut,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Inactive => "Inactive",
            StudentStatus::Withdrawn => "Withdrawn",
            StudentStatus::Graduated => "Graduated",
            StudentStatus::PassedOut => "Passed Out",
        }
    }

    /// Withdrawn and Inactive students appear on the struck-off register.
    pub fn is_struck_off(&self) -> bool {
        matches!(self, StudentStatus::Withdrawn | StudentStatus::Inactive)
    }
}

impl Default for StudentStatus {
    fn default() -> Self {
        StudentStatus::Active
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Active" => Ok(StudentStatus::Active),
            "Inactive" => Ok(StudentStatus::Inactive),
            "Withdrawn" => Ok(StudentStatus::Withdrawn),
            "Graduated" => Ok(StudentStatus::Graduated),
            "Passed Out" => Ok(StudentStatus::PassedOut),
            _ => Err(ParseEnumError::new("student status", s)),
        }
    }
}

/// Payment status of a challan. A challan only ever moves Unpaid -> Paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallanStatus {
    Unpaid,
    Paid,
}

impl ChallanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallanStatus::Unpaid => "Unpaid",
            ChallanStatus::Paid => "Paid",
        }
    }
}

impl fmt::Display for ChallanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallanStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Unpaid" => Ok(ChallanStatus::Unpaid),
            "Paid" => Ok(ChallanStatus::Paid),
            _ => Err(ParseEnumError::new("challan status", s)),
        }
    }
}

/// Admission form payload, used both to admit and to edit a student.
/// Dates are `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentPayload {
    pub full_name: String,
    pub class: String,
    pub status: Option<String>,
    pub date_of_birth: Option<String>,
    pub place_of_birth: String,
    pub last_school_attended: String,
    pub reason_for_leaving: String,
    pub father_name: String,
    pub father_occupation: String,
    pub father_office_address: String,
    pub mother_name: String,
    pub mother_occupation: String,
    pub mother_office_address: String,
    pub guardian_name: String,
    pub residential_address: String,
    pub contact_details: String,
    pub siblings: String,
    pub medical_info: String,
    pub admission_date: Option<String>,
    pub photo_path: Option<String>,
}

/// A single fee line: description and a non-negative amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeLineDto {
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChallanRequest {
    pub student_id: i64,
    /// Defaults to today when omitted
    pub issue_date: Option<String>,
    pub due_date: String,
    pub items: Vec<FeeLineDto>,
    #[serde(default)]
    pub arrears: f64,
    #[serde(default)]
    pub fine: f64,
}

/// Class-wide generation request. Missing items or grace period fall back to
/// the configured fee template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkChallanRequest {
    pub student_ids: Vec<i64>,
    pub items: Option<Vec<FeeLineDto>>,
    pub grace_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PayChallanRequest {
    /// Defaults to today when omitted
    pub payment_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoteRequest {
    pub student_ids: Vec<i64>,
    pub current_class: String,
    #[serde(default)]
    pub allow_override: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
