use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use super::{date_text, map_write_error, parse_literal, parse_optional_date, DbConnection};
use crate::domain::models::{NewStudent, Student, StudentDetails, StudentId};
use crate::storage::traits::StudentStorage;

const STUDENT_COLUMNS: &str = r#"
    student_id, full_name, date_of_birth, place_of_birth,
    class_into_which_admission_is_sought, last_school_attended,
    reason_for_leaving_last_school, father_name, father_occupation,
    father_office_address, mother_name, mother_occupation, mother_office_address,
    guardian_name, residential_address, contact_details, brothers_sisters_applicant,
    medical_info, admission_date, status, photo_path
"#;

/// Repository for student records
#[derive(Clone)]
pub struct StudentRepository {
    db: DbConnection,
}

impl StudentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn text(row: &SqliteRow, column: &str) -> Result<String> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    }

    fn row_to_student(row: &SqliteRow) -> Result<Student> {
        let class: Option<String> = row.try_get("class_into_which_admission_is_sought")?;
        let status: Option<String> = row.try_get("status")?;

        Ok(Student {
            id: row.try_get("student_id")?,
            full_name: row.try_get("full_name")?,
            class: parse_literal("class", class.as_deref().unwrap_or_default())?,
            status: parse_literal("status", status.as_deref().unwrap_or("Active"))?,
            date_of_birth: parse_optional_date("date_of_birth", row.try_get("date_of_birth")?)?,
            admission_date: parse_optional_date(
                "admission_date",
                row.try_get("admission_date")?,
            )?,
            photo_path: row
                .try_get::<Option<String>, _>("photo_path")?
                .filter(|path| !path.trim().is_empty()),
            details: StudentDetails {
                place_of_birth: Self::text(row, "place_of_birth")?,
                last_school_attended: Self::text(row, "last_school_attended")?,
                reason_for_leaving: Self::text(row, "reason_for_leaving_last_school")?,
                father_name: Self::text(row, "father_name")?,
                father_occupation: Self::text(row, "father_occupation")?,
                father_office_address: Self::text(row, "father_office_address")?,
                mother_name: Self::text(row, "mother_name")?,
                mother_occupation: Self::text(row, "mother_occupation")?,
                mother_office_address: Self::text(row, "mother_office_address")?,
                guardian_name: Self::text(row, "guardian_name")?,
                residential_address: Self::text(row, "residential_address")?,
                contact_details: Self::text(row, "contact_details")?,
                siblings: Self::text(row, "brothers_sisters_applicant")?,
                medical_info: Self::text(row, "medical_info")?,
            },
        })
    }

    /// Listings skip rows that cannot be decoded, such as a free-typed class
    /// from the old admissions form, so one bad record does not hide the rest.
    fn readable_student(row: &SqliteRow) -> Option<Student> {
        match Self::row_to_student(row) {
            Ok(student) => Some(student),
            Err(e) => {
                let id: Option<StudentId> = row.try_get("student_id").ok();
                warn!("Skipping unreadable student row {:?}: {}", id, e);
                None
            }
        }
    }
}

#[async_trait]
impl StudentStorage for StudentRepository {
    async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM students WHERE student_id = ?",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_student).transpose()
    }

    async fn list_students(&self, search_term: Option<&str>) -> Result<Vec<Student>> {
        let rows = match search_term.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => {
                sqlx::query(&format!(
                    "SELECT {} FROM students WHERE full_name LIKE ? ORDER BY student_id",
                    STUDENT_COLUMNS
                ))
                .bind(format!("%{}%", term))
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM students ORDER BY student_id",
                    STUDENT_COLUMNS
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };

        Ok(rows.iter().filter_map(Self::readable_student).collect())
    }

    async fn insert_student(&self, student: &NewStudent) -> Result<StudentId> {
        let details = &student.details;
        let result = sqlx::query(
            r#"
            INSERT INTO students (
                full_name, date_of_birth, place_of_birth, class_into_which_admission_is_sought,
                last_school_attended, reason_for_leaving_last_school, father_name, father_occupation,
                father_office_address, mother_name, mother_occupation, mother_office_address,
                guardian_name, residential_address, contact_details, brothers_sisters_applicant,
                medical_info, admission_date, status, photo_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&student.full_name)
        .bind(student.date_of_birth.map(date_text))
        .bind(&details.place_of_birth)
        .bind(student.class.as_str())
        .bind(&details.last_school_attended)
        .bind(&details.reason_for_leaving)
        .bind(&details.father_name)
        .bind(&details.father_occupation)
        .bind(&details.father_office_address)
        .bind(&details.mother_name)
        .bind(&details.mother_occupation)
        .bind(&details.mother_office_address)
        .bind(&details.guardian_name)
        .bind(&details.residential_address)
        .bind(&details.contact_details)
        .bind(&details.siblings)
        .bind(&details.medical_info)
        .bind(student.admission_date.map(date_text))
        .bind(student.status.as_str())
        .bind(&student.photo_path)
        .execute(self.db.pool())
        .await
        .map_err(map_write_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn update_student(&self, id: StudentId, student: &NewStudent) -> Result<bool> {
        let details = &student.details;
        let result = sqlx::query(
            r#"
            UPDATE students SET
                full_name = ?, date_of_birth = ?, place_of_birth = ?,
                class_into_which_admission_is_sought = ?, last_school_attended = ?,
                reason_for_leaving_last_school = ?, father_name = ?, father_occupation = ?,
                father_office_address = ?, mother_name = ?, mother_occupation = ?,
                mother_office_address = ?, guardian_name = ?, residential_address = ?,
                contact_details = ?, brothers_sisters_applicant = ?, medical_info = ?,
                admission_date = ?, status = ?, photo_path = ?
            WHERE student_id = ?
            "#,
        )
        .bind(&student.full_name)
        .bind(student.date_of_birth.map(date_text))
        .bind(&details.place_of_birth)
        .bind(student.class.as_str())
        .bind(&details.last_school_attended)
        .bind(&details.reason_for_leaving)
        .bind(&details.father_name)
        .bind(&details.father_occupation)
        .bind(&details.father_office_address)
        .bind(&details.mother_name)
        .bind(&details.mother_occupation)
        .bind(&details.mother_office_address)
        .bind(&details.guardian_name)
        .bind(&details.residential_address)
        .bind(&details.contact_details)
        .bind(&details.siblings)
        .bind(&details.medical_info)
        .bind(student.admission_date.map(date_text))
        .bind(student.status.as_str())
        .bind(&student.photo_path)
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(map_write_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_student(&self, id: StudentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE student_id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }
}
