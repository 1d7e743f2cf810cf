//! # Printable documents
//!
//! Assembles the data printed on fee vouchers and admission forms. Layout
//! belongs to a [`DocumentRenderer`]; this module only decides what goes on
//! the page.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{ChallanStatus, ClassLevel};
use std::sync::Arc;
use tracing::info;

use super::error::{LedgerError, LedgerResult};
use super::models::{ChallanId, ChallanWithItems, FeeLine, Student, StudentId};
use crate::storage::{ChallanStorage, Connection, StudentStorage};

/// One voucher is printed three times on a page, one copy per party.
pub const VOUCHER_COPIES: [&str; 3] = ["Bank Copy", "School Copy", "Student Copy"];

const PRINT_DATE_FORMAT: &str = "%d-%b-%Y";

/// Institution and bank details printed at the top of every document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherHeader {
    pub school_name: String,
    pub campus_name: String,
    pub bank_branch: String,
    pub bank_account: String,
    pub currency_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherDocument {
    pub header: VoucherHeader,
    pub copies: Vec<String>,
    pub challan_id: ChallanId,
    pub challan_number: String,
    pub printed_on: NaiveDate,
    pub roll_number: String,
    pub student_name: String,
    pub father_name: String,
    pub class: ClassLevel,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Stored items plus the arrears and fine pseudo-lines
    pub lines: Vec<FeeLine>,
    pub total_payable: f64,
    pub status: ChallanStatus,
    pub payment_date: Option<NaiveDate>,
}

impl VoucherDocument {
    pub fn build(
        header: VoucherHeader,
        student: &Student,
        record: &ChallanWithItems,
        printed_on: NaiveDate,
    ) -> Self {
        let challan = &record.challan;
        Self {
            header,
            copies: VOUCHER_COPIES.iter().map(|copy| copy.to_string()).collect(),
            challan_id: challan.id,
            challan_number: challan.challan_number(),
            printed_on,
            roll_number: roll_number(student.id),
            student_name: student.full_name.clone(),
            father_name: student.details.father_name.clone(),
            class: student.class,
            issue_date: challan.issue_date,
            due_date: challan.due_date,
            lines: record.display_lines(),
            total_payable: challan.total_amount,
            status: challan.status,
            payment_date: challan.payment_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSection {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

/// Admission form for a single student, grouped in the order the paper
/// form is filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionForm {
    pub header: VoucherHeader,
    pub student_id: StudentId,
    pub roll_number: String,
    pub photo_path: Option<String>,
    pub sections: Vec<FormSection>,
}

impl AdmissionForm {
    pub fn build(header: VoucherHeader, student: &Student) -> Self {
        let d = &student.details;
        let date = |value: Option<NaiveDate>| value.map(|v| v.to_string()).unwrap_or_default();
        let section = |title: &str, fields: &[(&str, &str)]| FormSection {
            title: title.to_string(),
            fields: fields
                .iter()
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect(),
        };

        let mut parents = vec![
            ("Father's Name", d.father_name.as_str()),
            ("Father's Occupation", d.father_occupation.as_str()),
            ("Father's Office Address", d.father_office_address.as_str()),
            ("Mother's Name", d.mother_name.as_str()),
            ("Mother's Occupation", d.mother_occupation.as_str()),
            ("Mother's Office Address", d.mother_office_address.as_str()),
        ];
        if !d.guardian_name.trim().is_empty() {
            parents.push(("Guardian Name", d.guardian_name.as_str()));
        }

        let born = date(student.date_of_birth);
        let admitted = date(student.admission_date);
        let roll = roll_number(student.id);

        Self {
            header,
            student_id: student.id,
            roll_number: roll.clone(),
            photo_path: student.photo_path.clone(),
            sections: vec![
                section(
                    "STUDENT INFORMATION",
                    &[
                        ("Full Name", student.full_name.as_str()),
                        ("Date of Birth", born.as_str()),
                        ("Place of Birth", d.place_of_birth.as_str()),
                        ("Admission Date", admitted.as_str()),
                        ("Class Admitted", student.class.as_str()),
                        ("Student ID", roll.as_str()),
                    ],
                ),
                section(
                    "PREVIOUS EDUCATION",
                    &[
                        ("Last School Attended", d.last_school_attended.as_str()),
                        ("Reason for Leaving", d.reason_for_leaving.as_str()),
                    ],
                ),
                section("PARENT / GUARDIAN INFORMATION", &parents),
                section(
                    "CONTACT DETAILS",
                    &[
                        ("Residential Address", d.residential_address.as_str()),
                        ("Emergency Contact", d.contact_details.as_str()),
                    ],
                ),
                section(
                    "ADDITIONAL INFORMATION",
                    &[
                        ("Siblings in School", d.siblings.as_str()),
                        ("Medical Information", d.medical_info.as_str()),
                    ],
                ),
                section("FOR OFFICE USE ONLY", &[("Status", student.status.as_str())]),
            ],
        }
    }
}

/// Roll numbers are student ids padded to four digits
pub fn roll_number(id: StudentId) -> String {
    format!("{:04}", id)
}

/// Whole currency units with thousands separators, e.g. `12,500`
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Turns document data into a printable representation.
pub trait DocumentRenderer: Send + Sync {
    /// MIME type of the rendered output
    fn content_type(&self) -> &'static str;

    fn render_voucher(&self, voucher: &VoucherDocument) -> String;

    fn render_admission_form(&self, form: &AdmissionForm) -> String;
}

/// Plain-text rendering, suitable for a line printer or a preview pane
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    const WIDTH: usize = 64;

    fn rule(out: &mut String, ch: char) {
        out.extend(std::iter::repeat(ch).take(Self::WIDTH));
        out.push('\n');
    }

    fn line(out: &mut String, text: &str) {
        out.push_str(text);
        out.push('\n');
    }

    fn centred(out: &mut String, text: &str) {
        Self::line(out, &format!("{:^width$}", text, width = Self::WIDTH));
    }

    fn spread(out: &mut String, left: &str, right: &str) {
        let pad = Self::WIDTH.saturating_sub(left.chars().count());
        Self::line(out, &format!("{}{:>pad$}", left, right, pad = pad));
    }
}

impl DocumentRenderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render_voucher(&self, voucher: &VoucherDocument) -> String {
        let header = &voucher.header;
        let symbol = &header.currency_symbol;
        let mut out = String::new();

        for (index, copy) in voucher.copies.iter().enumerate() {
            if index > 0 {
                Self::line(&mut out, &format!("Cut Here {}", "-".repeat(Self::WIDTH - 9)));
            }
            Self::spread(&mut out, "", copy);
            Self::centred(&mut out, &header.school_name);
            Self::centred(&mut out, &header.campus_name);
            Self::spread(
                &mut out,
                "FEE VOUCHER",
                &format!("Challan No: {}", voucher.challan_number),
            );
            Self::spread(
                &mut out,
                &header.bank_branch,
                &format!("Date: {}", voucher.printed_on.format(PRINT_DATE_FORMAT)),
            );
            Self::line(&mut out, &format!("A/C No: {}", header.bank_account));
            Self::rule(&mut out, '-');

            let student = if voucher.father_name.trim().is_empty() {
                voucher.student_name.clone()
            } else {
                format!("{} S/O {}", voucher.student_name, voucher.father_name)
            };
            Self::line(&mut out, &format!("Student:  {}", student));
            Self::spread(
                &mut out,
                &format!("Class:    {}", voucher.class),
                &format!("Roll: {}", voucher.roll_number),
            );
            Self::line(&mut out, &format!("Due Date: {}", voucher.due_date.format(PRINT_DATE_FORMAT)));
            Self::rule(&mut out, '-');

            Self::spread(&mut out, "Description", &format!("Amount ({})", symbol));
            for line in &voucher.lines {
                Self::spread(&mut out, &line.description, &format_amount(line.amount));
            }
            Self::rule(&mut out, '-');
            Self::spread(
                &mut out,
                "Total Payable",
                &format!("{} {}", symbol, format_amount(voucher.total_payable)),
            );
            if let Some(paid) = voucher.payment_date {
                Self::line(&mut out, &format!("PAID on {}", paid.format(PRINT_DATE_FORMAT)));
            }
            out.push('\n');
            Self::line(&mut out, "Officer Signature");
            Self::rule(&mut out, '=');
        }
        out
    }

    fn render_admission_form(&self, form: &AdmissionForm) -> String {
        let mut out = String::new();
        Self::centred(&mut out, &form.header.school_name);
        Self::centred(&mut out, &form.header.campus_name);
        Self::centred(&mut out, "Student Admission Form");
        Self::rule(&mut out, '=');

        for section in &form.sections {
            Self::line(&mut out, &section.title);
            for (label, value) in &section.fields {
                Self::line(&mut out, &format!("  {:<26}{}", format!("{}:", label), value));
            }
            out.push('\n');
        }
        Self::centred(&mut out, "This is a computer generated document.");
        out
    }
}

#[derive(Clone)]
pub struct VoucherService<C: Connection> {
    student_repository: C::StudentRepository,
    challan_repository: C::ChallanRepository,
    header: VoucherHeader,
}

impl<C: Connection> VoucherService<C> {
    pub fn new(connection: Arc<C>, header: VoucherHeader) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            challan_repository: connection.create_challan_repository(),
            header,
        }
    }

    pub async fn voucher(
        &self,
        challan_id: ChallanId,
        printed_on: NaiveDate,
    ) -> LedgerResult<VoucherDocument> {
        info!("Preparing voucher for challan {}", challan_id);

        let challan = self
            .challan_repository
            .get_challan(challan_id)
            .await?
            .ok_or(LedgerError::challan_not_found(challan_id))?;
        let items = self.challan_repository.get_challan_items(challan_id).await?;
        let student = self
            .student_repository
            .get_student(challan.student_id)
            .await?
            .ok_or(LedgerError::student_not_found(challan.student_id))?;

        let record = ChallanWithItems { challan, items };
        Ok(VoucherDocument::build(
            self.header.clone(),
            &student,
            &record,
            printed_on,
        ))
    }

    pub async fn admission_form(&self, student_id: StudentId) -> LedgerResult<AdmissionForm> {
        let student = self
            .student_repository
            .get_student(student_id)
            .await?
            .ok_or(LedgerError::student_not_found(student_id))?;
        Ok(AdmissionForm::build(self.header.clone(), &student))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NewChallan, NewStudent};
    use crate::storage::MemoryConnection;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn header() -> VoucherHeader {
        VoucherHeader {
            school_name: "IIUI SCHOOLS".to_string(),
            campus_name: "Ali Pur Chattha Campus".to_string(),
            bank_branch: "HBL P.M.C Branch, Faisalabad".to_string(),
            bank_account: "13497901233403".to_string(),
            currency_symbol: "Rs.".to_string(),
        }
    }

    async fn setup_test() -> (VoucherService<MemoryConnection>, StudentId, ChallanId) {
        let connection = Arc::new(MemoryConnection::new());
        let mut student = NewStudent::new("Ali Khan", ClassLevel::Grade3);
        student.details.father_name = "Imran Khan".to_string();
        let student_id = connection.insert_student(&student).await.unwrap();
        let challan = NewChallan::new(
            student_id,
            date("2026-10-01"),
            date("2026-10-16"),
            vec![FeeLine::new("Tuition Fee", 12500.0)],
            1500.0,
            0.0,
        )
        .unwrap();
        let challan_id = connection.insert_challan(&challan).await.unwrap();
        (VoucherService::new(connection, header()), student_id, challan_id)
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(950.0), "950");
        assert_eq!(format_amount(5000.0), "5,000");
        assert_eq!(format_amount(1234567.4), "1,234,567");
        assert_eq!(format_amount(999.6), "1,000");
    }

    #[test]
    fn test_roll_number_is_zero_padded() {
        assert_eq!(roll_number(7), "0007");
        assert_eq!(roll_number(12345), "12345");
    }

    #[tokio::test]
    async fn test_voucher_carries_pseudo_lines_and_frozen_total() {
        let (service, _, challan_id) = setup_test().await;
        let voucher = service.voucher(challan_id, date("2026-10-02")).await.unwrap();

        assert_eq!(voucher.challan_number, (1_000_000_000 + challan_id).to_string());
        assert_eq!(voucher.copies, vec!["Bank Copy", "School Copy", "Student Copy"]);
        assert_eq!(voucher.roll_number, "0001");
        assert_eq!(
            voucher.lines,
            vec![FeeLine::new("Tuition Fee", 12500.0), FeeLine::new("Arrears", 1500.0)]
        );
        assert_eq!(voucher.total_payable, 14000.0);
    }

    #[tokio::test]
    async fn test_text_voucher_prints_every_copy() {
        let (service, _, challan_id) = setup_test().await;
        let voucher = service.voucher(challan_id, date("2026-10-02")).await.unwrap();
        let text = TextRenderer.render_voucher(&voucher);

        for copy in VOUCHER_COPIES {
            assert!(text.contains(copy));
        }
        assert_eq!(text.matches("Cut Here").count(), 2);
        assert!(text.contains("Ali Khan S/O Imran Khan"));
        assert!(text.contains("Rs. 14,000"));
        assert!(text.contains("Due Date: 16-Oct-2026"));
        assert!(text.contains("A/C No: 13497901233403"));
    }

    #[tokio::test]
    async fn test_text_voucher_lines_span_the_page_width() {
        let (service, _, challan_id) = setup_test().await;
        let voucher = service.voucher(challan_id, date("2026-10-02")).await.unwrap();
        let text = TextRenderer.render_voucher(&voucher);

        assert!(text.ends_with('\n'));
        let total = text.lines().find(|l| l.starts_with("Total Payable")).unwrap();
        assert_eq!(total.chars().count(), TextRenderer::WIDTH);
        assert!(total.ends_with("Rs. 14,000"));
        for cut in text.lines().filter(|l| l.starts_with("Cut Here")) {
            assert_eq!(cut.chars().count(), TextRenderer::WIDTH);
        }
        let centred = text.lines().find(|l| l.trim() == "IIUI SCHOOLS").unwrap();
        assert!(centred.starts_with(' '));
        assert_eq!(centred.chars().count(), TextRenderer::WIDTH);
    }

    #[tokio::test]
    async fn test_admission_form_sections() {
        let (service, student_id, _) = setup_test().await;
        let form = service.admission_form(student_id).await.unwrap();

        let titles: Vec<_> = form.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles[0], "STUDENT INFORMATION");
        assert_eq!(titles.last(), Some(&"FOR OFFICE USE ONLY"));
        assert!(!form.sections[2].fields.iter().any(|(label, _)| label == "Guardian Name"));

        let text = TextRenderer.render_admission_form(&form);
        assert!(text.contains("Class Admitted:"));
        assert!(text.contains("Grade 3"));
    }

    #[tokio::test]
    async fn test_missing_documents_are_not_found() {
        let (service, _, _) = setup_test().await;
        assert!(matches!(
            service.voucher(99, date("2026-10-02")).await,
            Err(LedgerError::NotFound { entity: "challan", .. })
        ));
        assert!(matches!(
            service.admission_form(99).await,
            Err(LedgerError::NotFound { entity: "student", .. })
        ));
    }
}
