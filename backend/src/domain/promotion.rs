//! # Promotion
//!
//! End-of-term advancement of students to the next class. The progression
//! is a fixed table with exactly one successor per class. Reaching the
//! passed-out cohort is the single transition that also changes status.

use shared::{ClassLevel, StudentStatus};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::commands::promotion::{PromoteCommand, PromotedStudent, PromotionPreview};
use super::commands::{BatchFailure, BatchOutcome};
use super::error::{LedgerError, LedgerResult};
use super::models::{Student, StudentId};
use crate::storage::{Connection, StudentStorage};

/// Successor of every class. Hifz students stay in Hifz and the passed-out
/// cohort is a fixpoint.
pub const PROMOTION_PATH: [(ClassLevel, ClassLevel); 17] = [
    (ClassLevel::Playgroup, ClassLevel::Nursery),
    (ClassLevel::Nursery, ClassLevel::Prep),
    (ClassLevel::Prep, ClassLevel::Grade1),
    (ClassLevel::Grade1, ClassLevel::Grade2),
    (ClassLevel::Grade2, ClassLevel::Grade3),
    (ClassLevel::Grade3, ClassLevel::Grade4),
    (ClassLevel::Grade4, ClassLevel::Grade5),
    (ClassLevel::Grade5, ClassLevel::Grade6),
    (ClassLevel::Grade6, ClassLevel::Grade7),
    (ClassLevel::Grade7, ClassLevel::Grade8),
    (ClassLevel::Grade8, ClassLevel::Grade9),
    (ClassLevel::Grade9, ClassLevel::Grade10),
    (ClassLevel::Grade10, ClassLevel::PassedOut),
    (ClassLevel::OLevel, ClassLevel::PassedOut),
    (ClassLevel::ALevel, ClassLevel::PassedOut),
    (ClassLevel::Hifz, ClassLevel::Hifz),
    (ClassLevel::PassedOut, ClassLevel::PassedOut),
];

pub fn successor(class: ClassLevel) -> ClassLevel {
    PROMOTION_PATH
        .iter()
        .find(|(from, _)| *from == class)
        .map(|(_, to)| *to)
        .unwrap_or(class)
}

#[derive(Clone)]
pub struct PromotionService<C: Connection> {
    student_repository: C::StudentRepository,
}

impl<C: Connection> PromotionService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
        }
    }

    /// Where `current_class` promotes to and who would be promoted
    pub async fn preview(&self, current_class: ClassLevel) -> LedgerResult<PromotionPreview> {
        let mut eligible: Vec<Student> = self
            .student_repository
            .list_students(None)
            .await?
            .into_iter()
            .filter(|student| student.is_active() && student.class == current_class)
            .collect();
        eligible.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));

        Ok(PromotionPreview {
            current_class,
            target_class: successor(current_class),
            eligible_students: eligible,
        })
    }

    /// Promote the selected students out of `current_class`.
    ///
    /// Each student is checked and written on its own; a rejected or failed
    /// student is reported in the outcome while the others proceed, and
    /// students already written stay promoted.
    pub async fn promote(
        &self,
        command: PromoteCommand,
    ) -> LedgerResult<BatchOutcome<PromotedStudent>> {
        if command.current_class == ClassLevel::PassedOut {
            return Err(LedgerError::validation(
                "students who have passed out cannot be promoted",
            ));
        }

        let target = successor(command.current_class);
        info!(
            "Promoting {} students from {} to {} (override={})",
            command.student_ids.len(),
            command.current_class,
            target,
            command.allow_override
        );

        let mut seen = HashSet::new();
        let mut outcome = BatchOutcome::new();

        for student_id in command.student_ids {
            if !seen.insert(student_id) {
                continue;
            }
            match self
                .promote_one(student_id, command.current_class, target, command.allow_override)
                .await
            {
                Ok(promoted) => outcome.succeeded.push(promoted),
                Err(e) => {
                    error!("Failed to promote student {}: {}", student_id, e);
                    outcome.failed.push(BatchFailure {
                        student_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Promotion finished: {} promoted, {} failed",
            outcome.success_count(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    async fn promote_one(
        &self,
        student_id: StudentId,
        current_class: ClassLevel,
        target: ClassLevel,
        allow_override: bool,
    ) -> LedgerResult<PromotedStudent> {
        let student = self
            .student_repository
            .get_student(student_id)
            .await?
            .ok_or(LedgerError::student_not_found(student_id))?;

        if student.class != current_class || !student.is_active() {
            if !allow_override {
                return Err(LedgerError::ConstraintViolation(format!(
                    "student {} is {} in {}, not Active in {}",
                    student_id, student.status, student.class, current_class
                )));
            }
            warn!(
                "Overriding membership check for student {} ({} in {})",
                student_id, student.status, student.class
            );
        }

        let mut updated = student.to_new();
        updated.class = target;
        if target == ClassLevel::PassedOut {
            updated.status = StudentStatus::PassedOut;
        }

        if !self.student_repository.update_student(student_id, &updated).await? {
            return Err(LedgerError::student_not_found(student_id));
        }

        Ok(PromotedStudent {
            student_id,
            from_class: student.class,
            to_class: target,
            status: updated.status,
        })
    }
}
