//! # Reporting
//!
//! Read-only views derived from students and challans: dues per student,
//! defaulters and postings by class, daily collections, admission and
//! struck-off registers, and the class fee screen. Nothing here writes.
//!
//! Class-grouped reports iterate classes in progression order, not in the
//! alphabetical order of their names.

use chrono::{Datelike, Duration, NaiveDate};
use shared::{ChallanStatus, ClassLevel};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

use super::classification::{classify, FeeClassification};
use super::error::{LedgerError, LedgerResult};
use super::models::{
    ByClass, Challan, ClassChallanRow, ClassFeeView, CollectionDay, Dashboard, DefaulterEntry,
    FeeSummaryRow, PostingEntry, Student, StudentId,
};
use crate::storage::{ChallanFilter, ChallanStorage, Connection, StudentStorage};

#[derive(Clone)]
pub struct ReportService<C: Connection> {
    student_repository: C::StudentRepository,
    challan_repository: C::ChallanRepository,
}

impl<C: Connection> ReportService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            challan_repository: connection.create_challan_repository(),
        }
    }

    /// Outstanding dues of every Active student, largest first. Students
    /// with nothing unpaid are listed with a zero due.
    pub async fn fee_summary(&self) -> LedgerResult<Vec<FeeSummaryRow>> {
        let students = self.student_repository.list_students(None).await?;
        let unpaid = self
            .challan_repository
            .list_challans(&ChallanFilter::default().with_status(ChallanStatus::Unpaid))
            .await?;

        let mut dues: HashMap<StudentId, f64> = HashMap::new();
        for challan in &unpaid {
            *dues.entry(challan.student_id).or_default() += challan.total_amount;
        }

        let mut rows: Vec<FeeSummaryRow> = students
            .into_iter()
            .filter(Student::is_active)
            .map(|student| FeeSummaryRow {
                total_due: dues.get(&student.id).copied().unwrap_or(0.0),
                student_id: student.id,
                full_name: student.full_name,
                class: student.class,
                contact_details: student.details.contact_details,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_due
                .total_cmp(&a.total_due)
                .then(a.student_id.cmp(&b.student_id))
        });

        info!("Fee summary covers {} active students", rows.len());
        Ok(rows)
    }

    /// Active students owing a positive amount, by class then name
    pub async fn classwise_defaulters(&self) -> LedgerResult<ByClass<DefaulterEntry>> {
        let mut grouped: ByClass<DefaulterEntry> = BTreeMap::new();
        for row in self.fee_summary().await? {
            if row.total_due > 0.0 {
                grouped.entry(row.class).or_default().push(DefaulterEntry {
                    student_id: row.student_id,
                    full_name: row.full_name,
                    total_due: row.total_due,
                });
            }
        }
        for entries in grouped.values_mut() {
            entries.sort_by(|a, b| {
                a.full_name
                    .cmp(&b.full_name)
                    .then(a.student_id.cmp(&b.student_id))
            });
        }
        Ok(grouped)
    }

    /// Challans paid during the given calendar month, by class then name
    pub async fn posting_sheet(&self, month: u32, year: i32) -> LedgerResult<ByClass<PostingEntry>> {
        let (first, last) = month_bounds(month, year)?;
        info!("Building posting sheet for {}-{:02}", year, month);

        let paid = self
            .challan_repository
            .list_challans(&ChallanFilter::paid_between(first, last))
            .await?;
        let students = self.students_by_id().await?;

        let mut rows: Vec<(ClassLevel, PostingEntry)> = Vec::with_capacity(paid.len());
        for challan in paid {
            let (Some(student), Some(payment_date)) =
                (students.get(&challan.student_id), challan.payment_date)
            else {
                warn!("Skipping orphaned or undated paid challan {}", challan.id);
                continue;
            };
            rows.push((
                student.class,
                PostingEntry {
                    full_name: student.full_name.clone(),
                    challan_id: challan.id,
                    payment_date,
                    total_amount: challan.total_amount,
                    arrears: challan.arrears,
                    fine: challan.fine,
                },
            ));
        }
        rows.sort_by(|(class_a, a), (class_b, b)| {
            class_a
                .cmp(class_b)
                .then_with(|| a.full_name.cmp(&b.full_name))
                .then(a.payment_date.cmp(&b.payment_date))
                .then(a.challan_id.cmp(&b.challan_id))
        });

        let mut grouped: ByClass<PostingEntry> = BTreeMap::new();
        for (class, entry) in rows {
            grouped.entry(class).or_default().push(entry);
        }
        Ok(grouped)
    }

    /// Paid challans per payment day within an inclusive range, earliest first
    pub async fn collection_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Vec<CollectionDay>> {
        check_range(start, end)?;
        let paid = self
            .challan_repository
            .list_challans(&ChallanFilter::paid_between(start, end))
            .await?;

        let mut days: BTreeMap<NaiveDate, CollectionDay> = BTreeMap::new();
        for challan in paid {
            let Some(payment_date) = challan.payment_date else {
                continue;
            };
            let day = days.entry(payment_date).or_insert(CollectionDay {
                payment_date,
                count: 0,
                total_collected: 0.0,
            });
            day.count += 1;
            day.total_collected += challan.total_amount;
        }
        Ok(days.into_values().collect())
    }

    /// Students admitted within an inclusive range, earliest admission first.
    /// Records without an admission date never match.
    pub async fn new_admissions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Vec<Student>> {
        check_range(start, end)?;
        let mut admitted: Vec<Student> = self
            .student_repository
            .list_students(None)
            .await?
            .into_iter()
            .filter(|student| {
                student
                    .admission_date
                    .is_some_and(|date| start <= date && date <= end)
            })
            .collect();
        admitted.sort_by(|a, b| a.admission_date.cmp(&b.admission_date).then(a.id.cmp(&b.id)));
        Ok(admitted)
    }

    /// Withdrawn and Inactive students by name
    pub async fn struck_off(&self) -> LedgerResult<Vec<Student>> {
        self.students_sorted_by_name(|student| student.status.is_struck_off())
            .await
    }

    /// Alumni by name
    pub async fn passed_out(&self) -> LedgerResult<Vec<Student>> {
        self.students_sorted_by_name(Student::is_passed_out).await
    }

    pub async fn dashboard(&self) -> LedgerResult<Dashboard> {
        let summary = self.fee_summary().await?;
        let collected = self
            .challan_repository
            .list_challans(&ChallanFilter::default().with_status(ChallanStatus::Paid))
            .await?;

        let (defaulters, clear_accounts): (Vec<_>, Vec<_>) =
            summary.into_iter().partition(|row| row.total_due > 0.0);

        Ok(Dashboard {
            total_pending: defaulters.iter().map(|row| row.total_due).sum(),
            total_collected: collected.iter().map(|c| c.total_amount).sum(),
            defaulters,
            clear_accounts,
        })
    }

    /// The class fee screen: Active members of the class and every challan
    /// of the class's students split into the three classification buckets,
    /// latest due date first.
    pub async fn class_fee_view(
        &self,
        class: ClassLevel,
        today: NaiveDate,
    ) -> LedgerResult<ClassFeeView> {
        let in_class: HashMap<StudentId, Student> = self
            .students_by_id()
            .await?
            .into_iter()
            .filter(|(_, student)| student.class == class)
            .collect();

        let mut challans: Vec<Challan> = self
            .challan_repository
            .list_challans(&ChallanFilter::default())
            .await?
            .into_iter()
            .filter(|challan| in_class.contains_key(&challan.student_id))
            .collect();
        challans.sort_by(|a, b| b.due_date.cmp(&a.due_date).then(b.id.cmp(&a.id)));

        let mut view = ClassFeeView {
            class,
            students: Vec::new(),
            unpaid: Vec::new(),
            defaulters: Vec::new(),
            paid: Vec::new(),
        };

        for challan in challans {
            let classification = classify(&challan, today);
            let full_name = in_class
                .get(&challan.student_id)
                .map(|student| student.full_name.clone())
                .unwrap_or_default();
            let row = ClassChallanRow {
                student_id: challan.student_id,
                full_name,
                challan_id: challan.id,
                due_date: challan.due_date,
                total_amount: challan.total_amount,
                status: challan.status,
                classification,
            };
            match classification {
                FeeClassification::Unpaid => view.unpaid.push(row),
                FeeClassification::Defaulter => view.defaulters.push(row),
                FeeClassification::Paid => view.paid.push(row),
            }
        }

        view.students = in_class.into_values().filter(Student::is_active).collect();
        view.students
            .sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(view)
    }

    async fn students_by_id(&self) -> LedgerResult<HashMap<StudentId, Student>> {
        let students = self.student_repository.list_students(None).await?;
        Ok(students.into_iter().map(|s| (s.id, s)).collect())
    }

    async fn students_sorted_by_name(
        &self,
        keep: impl Fn(&Student) -> bool + Send,
    ) -> LedgerResult<Vec<Student>> {
        let mut students: Vec<Student> = self
            .student_repository
            .list_students(None)
            .await?
            .into_iter()
            .filter(|student| keep(student))
            .collect();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(students)
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> LedgerResult<()> {
    if start > end {
        return Err(LedgerError::validation(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}

/// First and last day of a calendar month
fn month_bounds(month: u32, year: i32) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LedgerError::validation(format!("invalid month {}-{}", year, month)))?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| LedgerError::validation(format!("invalid month {}-{}", year, month)))?;
    Ok((first, next - Duration::days(1)))
}
