//! Domain-level command and result types for batch operations.
//! The REST layer maps the public DTOs in `shared` onto these.

use serde::{Deserialize, Serialize};

use super::models::StudentId;

/// One failed member of a batch, reported to the caller instead of aborting
/// the rest of the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub student_id: StudentId,
    pub reason: String,
}

/// Audit result of a batch: every member lands in exactly one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub mod challans {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    use crate::domain::models::{ChallanId, FeeLine, StudentId};

    /// Class-wide challan generation from a flat fee template.
    #[derive(Debug, Clone)]
    pub struct BulkChallanCommand {
        pub student_ids: Vec<StudentId>,
        pub items: Vec<FeeLine>,
        pub issue_date: NaiveDate,
        pub grace_days: i64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GeneratedChallan {
        pub student_id: StudentId,
        pub challan_id: ChallanId,
    }
}

pub mod promotion {
    use serde::{Deserialize, Serialize};
    use shared::{ClassLevel, StudentStatus};

    use crate::domain::models::{Student, StudentId};

    #[derive(Debug, Clone)]
    pub struct PromoteCommand {
        pub student_ids: Vec<StudentId>,
        pub current_class: ClassLevel,
        /// Skip the per-student class and status membership check
        pub allow_override: bool,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PromotedStudent {
        pub student_id: StudentId,
        pub from_class: ClassLevel,
        pub to_class: ClassLevel,
        pub status: StudentStatus,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PromotionPreview {
        pub current_class: ClassLevel,
        pub target_class: ClassLevel,
        pub eligible_students: Vec<Student>,
    }
}
