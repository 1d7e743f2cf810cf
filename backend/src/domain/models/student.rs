//! Domain model for an enrolled student.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{ClassLevel, StudentStatus};

pub type StudentId = i64;

/// Free-text admission form fields. Empty strings mean "not provided".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentDetails {
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
}

/// A student record as admitted or edited, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub full_name: String,
    pub class: ClassLevel,
    pub status: StudentStatus,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub photo_path: Option<String>,
    pub details: StudentDetails,
}

impl NewStudent {
    /// Minimal admission with only the mandatory fields.
    pub fn new(full_name: impl Into<String>, class: ClassLevel) -> Self {
        Self {
            full_name: full_name.into(),
            class,
            status: StudentStatus::Active,
            date_of_birth: None,
            admission_date: None,
            photo_path: None,
            details: StudentDetails::default(),
        }
    }

    pub fn with_id(self, id: StudentId) -> Student {
        Student {
            id,
            full_name: self.full_name,
            class: self.class,
            status: self.status,
            date_of_birth: self.date_of_birth,
            admission_date: self.admission_date,
            photo_path: self.photo_path,
            details: self.details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub class: ClassLevel,
    pub status: StudentStatus,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub photo_path: Option<String>,
    #[serde(flatten)]
    pub details: StudentDetails,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }

    /// Alumni are recognised by either the terminal status or the terminal
    /// class, since older records may carry only one of the two.
    pub fn is_passed_out(&self) -> bool {
        self.status == StudentStatus::PassedOut || self.class == ClassLevel::PassedOut
    }

    pub fn to_new(&self) -> NewStudent {
        NewStudent {
            full_name: self.full_name.clone(),
            class: self.class,
            status: self.status,
            date_of_birth: self.date_of_birth,
            admission_date: self.admission_date,
            photo_path: self.photo_path.clone(),
            details: self.details.clone(),
        }
    }
}
