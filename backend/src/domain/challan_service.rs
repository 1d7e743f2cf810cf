//! Challan ledger: issuing fee vouchers, recording payments and reading them
//! back with their line items.

use chrono::{Duration, NaiveDate};
use shared::ChallanStatus;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::commands::challans::{BulkChallanCommand, GeneratedChallan};
use super::commands::{BatchFailure, BatchOutcome};
use super::error::{LedgerError, LedgerResult};
use super::models::{
    validate_fee_lines, Challan, ChallanId, ChallanWithItems, FeeLine, NewChallan, StudentId,
};
use crate::storage::{ChallanFilter, ChallanStorage, Connection, StudentStorage};

#[derive(Clone)]
pub struct ChallanService<C: Connection> {
    student_repository: C::StudentRepository,
    challan_repository: C::ChallanRepository,
}

impl<C: Connection> ChallanService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            challan_repository: connection.create_challan_repository(),
        }
    }

    /// Issue a challan. The total is frozen at this point and the challan is
    /// stored together with its items or not at all.
    pub async fn create_challan(
        &self,
        student_id: StudentId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        items: Vec<FeeLine>,
        arrears: f64,
        fine: f64,
    ) -> LedgerResult<ChallanId> {
        info!(
            "Creating challan: student={}, issue={}, due={}, items={}",
            student_id,
            issue_date,
            due_date,
            items.len()
        );

        if due_date < issue_date {
            return Err(LedgerError::validation(format!(
                "due date {} is before issue date {}",
                due_date, issue_date
            )));
        }
        let challan = NewChallan::new(student_id, issue_date, due_date, items, arrears, fine)?;

        if self.student_repository.get_student(student_id).await?.is_none() {
            warn!("Cannot create challan, student not found: {}", student_id);
            return Err(LedgerError::student_not_found(student_id));
        }

        let id = self.challan_repository.insert_challan(&challan).await?;

        info!(
            "Created challan {} for student {} totalling {}",
            id,
            student_id,
            challan.total_amount()
        );
        Ok(id)
    }

    /// Record payment of an unpaid challan. A challan is paid exactly once;
    /// paying it again is refused and the first payment date stands.
    pub async fn pay_challan(
        &self,
        id: ChallanId,
        payment_date: NaiveDate,
    ) -> LedgerResult<Challan> {
        info!("Paying challan {} on {}", id, payment_date);

        let mut challan = self
            .challan_repository
            .get_challan(id)
            .await?
            .ok_or(LedgerError::challan_not_found(id))?;

        if challan.is_paid() {
            warn!(
                "Challan {} already paid on {:?}",
                id, challan.payment_date
            );
            return Err(LedgerError::AlreadyPaid(id));
        }
        if payment_date < challan.issue_date {
            return Err(LedgerError::validation(format!(
                "payment date {} is before issue date {}",
                payment_date, challan.issue_date
            )));
        }

        let updated = self
            .challan_repository
            .update_challan_status(id, ChallanStatus::Paid, Some(payment_date))
            .await?;
        if !updated {
            return Err(LedgerError::challan_not_found(id));
        }

        challan.status = ChallanStatus::Paid;
        challan.payment_date = Some(payment_date);
        Ok(challan)
    }

    /// Every challan of a student, most recent issue date first
    pub async fn challans_for_student(&self, student_id: StudentId) -> LedgerResult<Vec<Challan>> {
        self.ensure_student(student_id).await?;
        let challans = self
            .challan_repository
            .list_challans(&ChallanFilter::for_student(student_id))
            .await?;
        Ok(challans)
    }

    pub async fn unpaid_challans(&self, student_id: StudentId) -> LedgerResult<Vec<Challan>> {
        self.ensure_student(student_id).await?;
        let filter = ChallanFilter::for_student(student_id).with_status(ChallanStatus::Unpaid);
        Ok(self.challan_repository.list_challans(&filter).await?)
    }

    pub async fn challan_with_items(&self, id: ChallanId) -> LedgerResult<ChallanWithItems> {
        let challan = self
            .challan_repository
            .get_challan(id)
            .await?
            .ok_or(LedgerError::challan_not_found(id))?;
        let items = self.challan_repository.get_challan_items(id).await?;
        Ok(ChallanWithItems { challan, items })
    }

    /// Issue the same fee template to every listed student. Each student is
    /// an independent command: a failure is recorded against that student
    /// and the batch carries on. Repeated ids are billed once. Nothing already
    /// issued is rolled back.
    pub async fn generate_bulk(
        &self,
        command: BulkChallanCommand,
    ) -> LedgerResult<BatchOutcome<GeneratedChallan>> {
        info!(
            "Generating challans for {} students, grace {} days",
            command.student_ids.len(),
            command.grace_days
        );

        // Template problems would fail every member alike, so they are
        // reported once before anything is written.
        if command.items.is_empty() {
            return Err(LedgerError::validation("fee template has no items"));
        }
        validate_fee_lines(&command.items)?;
        if command.grace_days < 0 {
            return Err(LedgerError::validation("grace period cannot be negative"));
        }

        let due_date = command.issue_date + Duration::days(command.grace_days);
        let mut seen = HashSet::new();
        let mut outcome = BatchOutcome::new();

        for student_id in command.student_ids {
            if !seen.insert(student_id) {
                continue;
            }
            match self
                .create_challan(
                    student_id,
                    command.issue_date,
                    due_date,
                    command.items.clone(),
                    0.0,
                    0.0,
                )
                .await
            {
                Ok(challan_id) => outcome.succeeded.push(GeneratedChallan {
                    student_id,
                    challan_id,
                }),
                Err(e) => {
                    error!("Failed to generate challan for student {}: {}", student_id, e);
                    outcome.failed.push(BatchFailure {
                        student_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Bulk generation finished: {} issued, {} failed",
            outcome.success_count(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    async fn ensure_student(&self, student_id: StudentId) -> LedgerResult<()> {
        match self.student_repository.get_student(student_id).await? {
            Some(_) => Ok(()),
            None => Err(LedgerError::student_not_found(student_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NewStudent;
    use crate::storage::MemoryConnection;
    use shared::ClassLevel;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup_test() -> (ChallanService<MemoryConnection>, Arc<MemoryConnection>) {
        let connection = Arc::new(MemoryConnection::new());
        (ChallanService::new(connection.clone()), connection)
    }

    async fn admit(connection: &MemoryConnection, name: &str, class: ClassLevel) -> StudentId {
        connection
            .insert_student(&NewStudent::new(name, class))
            .await
            .unwrap()
    }

    fn tuition() -> Vec<FeeLine> {
        vec![FeeLine::new("Tuition Fee", 5000.0)]
    }

    #[tokio::test]
    async fn test_create_then_pay_challan() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;
        let today = date("2026-10-16");

        let id = service
            .create_challan(ali, today, today + Duration::days(15), tuition(), 0.0, 0.0)
            .await
            .unwrap();
        let issued = service.challan_with_items(id).await.unwrap();
        assert_eq!(issued.challan.total_amount, 5000.0);
        assert_eq!(issued.challan.status, ChallanStatus::Unpaid);
        assert_eq!(issued.items, tuition());

        let paid = service.pay_challan(id, today).await.unwrap();
        assert_eq!(paid.status, ChallanStatus::Paid);
        assert_eq!(paid.payment_date, Some(today));
        assert!(service.unpaid_challans(ali).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_payment_keeps_first_date() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;
        let id = service
            .create_challan(ali, date("2026-10-01"), date("2026-10-16"), tuition(), 0.0, 0.0)
            .await
            .unwrap();

        service.pay_challan(id, date("2026-10-05")).await.unwrap();
        let err = service.pay_challan(id, date("2026-10-09")).await.unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyPaid(paid) if paid == id));

        let stored = service.challan_with_items(id).await.unwrap().challan;
        assert_eq!(stored.status, ChallanStatus::Paid);
        assert_eq!(stored.payment_date, Some(date("2026-10-05")));
    }

    #[tokio::test]
    async fn test_payment_before_issue_is_rejected() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;
        let id = service
            .create_challan(ali, date("2026-10-01"), date("2026-10-16"), tuition(), 0.0, 0.0)
            .await
            .unwrap();

        let err = service.pay_challan(id, date("2026-09-30")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_references_are_not_found() {
        let (service, _) = setup_test();
        let err = service
            .create_challan(5, date("2026-10-01"), date("2026-10-16"), tuition(), 0.0, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "student", .. }));

        let err = service.pay_challan(12, date("2026-10-01")).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "challan", .. }));
        assert!(service.challan_with_items(12).await.is_err());
        assert!(service.challans_for_student(5).await.is_err());
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_write() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;

        let err = service
            .create_challan(
                ali,
                date("2026-10-01"),
                date("2026-10-16"),
                vec![FeeLine::new("Tuition Fee", -5.0)],
                0.0,
                0.0,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = service
            .create_challan(ali, date("2026-10-16"), date("2026-10-01"), tuition(), 0.0, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        assert!(service.challans_for_student(ali).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_is_frozen_at_creation() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;
        let id = service
            .create_challan(
                ali,
                date("2026-10-01"),
                date("2026-10-16"),
                vec![FeeLine::new("Tuition Fee", 5000.0), FeeLine::new("Transport", 1500.0)],
                2000.0,
                250.0,
            )
            .await
            .unwrap();
        service.pay_challan(id, date("2026-10-02")).await.unwrap();

        let record = service.challan_with_items(id).await.unwrap();
        assert_eq!(record.challan.total_amount, 8750.0);
        let shown: f64 = record.display_lines().iter().map(|line| line.amount).sum();
        assert_eq!(shown, record.challan.total_amount);
    }

    #[tokio::test]
    async fn test_challans_for_student_newest_first() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;
        for issue in ["2026-08-01", "2026-10-01", "2026-09-01"] {
            let issue = date(issue);
            service
                .create_challan(ali, issue, issue + Duration::days(15), tuition(), 0.0, 0.0)
                .await
                .unwrap();
        }

        let issued: Vec<_> = service
            .challans_for_student(ali)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.issue_date)
            .collect();
        assert_eq!(
            issued,
            vec![date("2026-10-01"), date("2026-09-01"), date("2026-08-01")]
        );
    }

    #[tokio::test]
    async fn test_bulk_generation_reports_failures_per_student() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;
        let sara = admit(&connection, "Sara Ahmed", ClassLevel::Grade3).await;
        let bilal = admit(&connection, "Bilal", ClassLevel::Grade3).await;
        connection.fail_writes_for(sara);

        let outcome = service
            .generate_bulk(BulkChallanCommand {
                student_ids: vec![ali, sara, 404, bilal],
                items: tuition(),
                issue_date: date("2026-10-16"),
                grace_days: 15,
            })
            .await
            .unwrap();

        let issued: Vec<_> = outcome.succeeded.iter().map(|g| g.student_id).collect();
        let failed: Vec<_> = outcome.failed.iter().map(|f| f.student_id).collect();
        assert_eq!(issued, vec![ali, bilal]);
        assert_eq!(failed, vec![sara, 404]);
        assert!(!outcome.is_complete());

        let challan = service.challan_with_items(outcome.succeeded[0].challan_id).await.unwrap();
        assert_eq!(challan.challan.due_date, date("2026-10-31"));
        assert_eq!(challan.challan.arrears, 0.0);
        assert_eq!(challan.challan.fine, 0.0);
    }

    #[tokio::test]
    async fn test_bulk_generation_rejects_bad_template() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;

        let err = service
            .generate_bulk(BulkChallanCommand {
                student_ids: vec![ali],
                items: vec![],
                issue_date: date("2026-10-16"),
                grace_days: 15,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = service
            .generate_bulk(BulkChallanCommand {
                student_ids: vec![ali],
                items: tuition(),
                issue_date: date("2026-10-16"),
                grace_days: -1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(service.challans_for_student(ali).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_generation_bills_each_student_once() {
        let (service, connection) = setup_test();
        let ali = admit(&connection, "Ali Khan", ClassLevel::Grade3).await;
        let sara = admit(&connection, "Sara Ahmed", ClassLevel::Grade3).await;

        let outcome = service
            .generate_bulk(BulkChallanCommand {
                student_ids: vec![ali, sara, ali],
                items: tuition(),
                issue_date: date("2026-10-16"),
                grace_days: 15,
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count(), 2);
        assert!(outcome.is_complete());
        assert_eq!(service.challans_for_student(ali).await.unwrap().len(), 1);
        assert_eq!(service.challans_for_student(sara).await.unwrap().len(), 1);
    }
}
