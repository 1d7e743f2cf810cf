//! Student directory: admissions, edits, lookups and administrative deletes.

use shared::{ClassLevel, StudentStatus};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{LedgerError, LedgerResult};
use super::models::{NewStudent, Student, StudentId};
use crate::storage::{ChallanFilter, ChallanStorage, Connection, StudentStorage};

const MAX_NAME_LENGTH: usize = 150;

#[derive(Clone)]
pub struct StudentService<C: Connection> {
    student_repository: C::StudentRepository,
    challan_repository: C::ChallanRepository,
}

impl<C: Connection> StudentService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            challan_repository: connection.create_challan_repository(),
        }
    }

    /// Admit a new student and return the stored record
    pub async fn admit(&self, student: NewStudent) -> LedgerResult<Student> {
        let student = Self::validated(student)?;
        info!("Admitting student: name={}, class={}", student.full_name, student.class);

        let id = self.student_repository.insert_student(&student).await?;

        info!("Admitted student {} with ID: {}", student.full_name, id);
        Ok(student.with_id(id))
    }

    /// Replace every editable field of an existing student
    pub async fn update(&self, id: StudentId, student: NewStudent) -> LedgerResult<Student> {
        let student = Self::validated(student)?;
        info!("Updating student: {}", id);

        if !self.student_repository.update_student(id, &student).await? {
            warn!("Student not found: {}", id);
            return Err(LedgerError::student_not_found(id));
        }

        Ok(student.with_id(id))
    }

    pub async fn get(&self, id: StudentId) -> LedgerResult<Student> {
        self.student_repository
            .get_student(id)
            .await?
            .ok_or(LedgerError::student_not_found(id))
    }

    /// Substring search on the full name; a blank term lists everyone
    pub async fn search(&self, term: Option<&str>) -> LedgerResult<Vec<Student>> {
        let students = self.student_repository.list_students(term).await?;
        info!("Found {} students for search {:?}", students.len(), term);
        Ok(students)
    }

    pub async fn active_students(&self) -> LedgerResult<Vec<Student>> {
        let students = self.student_repository.list_students(None).await?;
        Ok(students.into_iter().filter(Student::is_active).collect())
    }

    /// Active students currently in `class`, ordered by name
    pub async fn students_in_class(&self, class: ClassLevel) -> LedgerResult<Vec<Student>> {
        let mut students: Vec<Student> = self
            .active_students()
            .await?
            .into_iter()
            .filter(|student| student.class == class)
            .collect();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(students)
    }

    /// Administrative delete. Without `cascade` a student who still owns
    /// challans is refused so fee history is never dropped by accident.
    pub async fn delete(&self, id: StudentId, cascade: bool) -> LedgerResult<()> {
        info!("Deleting student: {} (cascade={})", id, cascade);

        let student = self.get(id).await?;

        if !cascade {
            let owned = self
                .challan_repository
                .list_challans(&ChallanFilter::for_student(id))
                .await?;
            if !owned.is_empty() {
                return Err(LedgerError::ConstraintViolation(format!(
                    "student {} still has {} challan(s); delete with cascade to remove them",
                    id,
                    owned.len()
                )));
            }
        }

        if !self.student_repository.delete_student(id).await? {
            return Err(LedgerError::student_not_found(id));
        }

        info!("Deleted student: {} with ID: {}", student.full_name, id);
        Ok(())
    }

    fn validated(mut student: NewStudent) -> LedgerResult<NewStudent> {
        student.full_name = student.full_name.trim().to_string();

        if student.full_name.is_empty() {
            return Err(LedgerError::validation("Student name cannot be empty"));
        }
        if student.full_name.chars().count() > MAX_NAME_LENGTH {
            return Err(LedgerError::validation(format!(
                "Student name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        if let (Some(born), Some(admitted)) = (student.date_of_birth, student.admission_date) {
            if born > admitted {
                return Err(LedgerError::validation(
                    "Date of birth cannot be after the admission date",
                ));
            }
        }
        if student.class == ClassLevel::PassedOut && student.status == StudentStatus::Active {
            warn!("Admitting {} directly into the passed-out cohort", student.full_name);
        }

        Ok(student)
    }
}
