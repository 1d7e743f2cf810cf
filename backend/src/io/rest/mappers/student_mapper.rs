use shared::{StudentPayload, StudentStatus};

use super::{parse_class, parse_optional_date};
use crate::domain::models::{NewStudent, StudentDetails};
use crate::domain::{LedgerError, LedgerResult};

pub struct StudentMapper;

impl StudentMapper {
    /// Convert the admission form payload into a domain record.
    /// A missing status means Active.
    pub fn to_domain(payload: StudentPayload) -> LedgerResult<NewStudent> {
        let status = match payload.status.as_deref().map(str::trim) {
            None | Some("") => StudentStatus::Active,
            Some(text) => text
                .parse()
                .map_err(|e: shared::ParseEnumError| LedgerError::validation(e.to_string()))?,
        };

        Ok(NewStudent {
            class: parse_class(&payload.class)?,
            status,
            date_of_birth: parse_optional_date("date_of_birth", payload.date_of_birth.as_deref())?,
            admission_date: parse_optional_date(
                "admission_date",
                payload.admission_date.as_deref(),
            )?,
            photo_path: payload.photo_path.filter(|path| !path.trim().is_empty()),
            full_name: payload.full_name,
            details: StudentDetails {
                place_of_birth: payload.place_of_birth,
                last_school_attended: payload.last_school_attended,
                reason_for_leaving: payload.reason_for_leaving,
                father_name: payload.father_name,
                father_occupation: payload.father_occupation,
                father_office_address: payload.father_office_address,
                mother_name: payload.mother_name,
                mother_occupation: payload.mother_occupation,
                mother_office_address: payload.mother_office_address,
                guardian_name: payload.guardian_name,
                residential_address: payload.residential_address,
                contact_details: payload.contact_details,
                siblings: payload.siblings,
                medical_info: payload.medical_info,
            },
        })
    }
}
