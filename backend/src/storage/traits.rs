//! # Storage Traits
//!
//! Storage abstraction used by the domain services. Implementations must
//! honour the ownership rules: deleting a student removes its challans and
//! their items, and a challan is inserted together with its items or not at
//! all.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::ChallanStatus;

use crate::domain::models::{
    Challan, ChallanId, FeeLine, NewChallan, NewStudent, Student, StudentId,
};

#[async_trait]
pub trait StudentStorage: Send + Sync {
    async fn get_student(&self, id: StudentId) -> Result<Option<Student>>;

    /// All students ordered by id, optionally filtered by a case-insensitive
    /// substring of the full name
    async fn list_students(&self, search_term: Option<&str>) -> Result<Vec<Student>>;

    async fn insert_student(&self, student: &NewStudent) -> Result<StudentId>;

    /// Replace every field of an existing student.
    /// Returns false when no student has this id.
    async fn update_student(&self, id: StudentId, student: &NewStudent) -> Result<bool>;

    /// Delete a student together with its challans and their items.
    /// Returns false when no student has this id.
    async fn delete_student(&self, id: StudentId) -> Result<bool>;
}

/// Filter for challan listings. Unset fields do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChallanFilter {
    pub student_id: Option<StudentId>,
    pub status: Option<ChallanStatus>,
    /// Inclusive payment date range
    pub paid_between: Option<(NaiveDate, NaiveDate)>,
}

impl ChallanFilter {
    pub fn for_student(student_id: StudentId) -> Self {
        Self {
            student_id: Some(student_id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: ChallanStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paid_between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            status: Some(ChallanStatus::Paid),
            paid_between: Some((start, end)),
            ..Self::default()
        }
    }

    pub fn matches(&self, challan: &Challan) -> bool {
        if self.student_id.is_some_and(|id| id != challan.student_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != challan.status) {
            return false;
        }
        if let Some((start, end)) = self.paid_between {
            return challan
                .payment_date
                .is_some_and(|paid| start <= paid && paid <= end);
        }
        true
    }
}

#[async_trait]
pub trait ChallanStorage: Send + Sync {
    /// Insert the challan and all of its items atomically
    async fn insert_challan(&self, challan: &NewChallan) -> Result<ChallanId>;

    async fn get_challan(&self, id: ChallanId) -> Result<Option<Challan>>;

    /// Stored line items in insertion order
    async fn get_challan_items(&self, id: ChallanId) -> Result<Vec<FeeLine>>;

    /// Matching challans, most recent issue date first (ties: newest id first)
    async fn list_challans(&self, filter: &ChallanFilter) -> Result<Vec<Challan>>;

    /// Returns false when no challan has this id
    async fn update_challan_status(
        &self,
        id: ChallanId,
        status: ChallanStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<bool>;
}

/// Factory for the repositories of one storage backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type StudentRepository: StudentStorage + Clone + 'static;
    type ChallanRepository: ChallanStorage + Clone + 'static;

    fn create_student_repository(&self) -> Self::StudentRepository;

    fn create_challan_repository(&self) -> Self::ChallanRepository;
}
