//! # Domain Module
//!
//! Business rules of the school fee ledger, independent of HTTP and of the
//! storage engine. Services are generic over [`crate::storage::Connection`]
//! so they run the same against SQLite and the in-memory store.
//!
//! ## Module Organization
//!
//! - **student_service**: admissions, edits, search and administrative deletes
//! - **challan_service**: issuing challans, payments, class-wide generation
//! - **classification**: Unpaid / Defaulter / Paid derived from the due date
//! - **report_service**: dues, defaulters, posting sheets, collections, registers
//! - **promotion**: the class progression table and bulk promotion
//! - **voucher**: data for printed vouchers and admission forms
//!
//! ## Business Rules
//!
//! - A challan total is the sum of its items, arrears and fine, frozen when
//!   the challan is issued
//! - A challan moves from Unpaid to Paid once and never back
//! - A challan is a Defaulter only when unpaid strictly after its due date
//! - Promotion to the passed-out cohort also sets the passed-out status
//! - Batch operations report each failed member instead of stopping

pub mod challan_service;
pub mod classification;
pub mod commands;
pub mod error;
pub mod models;
pub mod promotion;
pub mod report_service;
pub mod student_service;
pub mod voucher;

pub use challan_service::ChallanService;
pub use error::{LedgerError, LedgerResult};
pub use promotion::PromotionService;
pub use report_service::ReportService;
pub use student_service::StudentService;
pub use voucher::VoucherService;
