//! # School Ledger Backend
//!
//! Student records and fee challans for a single-campus school office.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, mappers)
//!     ↓
//! Domain Layer (services, validation, reports)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! Settings come from a YAML file (see [`config`]) and are read once at
//! start-up.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::LedgerSettings;
use crate::domain::voucher::{DocumentRenderer, TextRenderer};
use crate::domain::{
    ChallanService, PromotionService, ReportService, StudentService, VoucherService,
};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<LedgerSettings>,
    pub student_service: StudentService<DbConnection>,
    pub challan_service: ChallanService<DbConnection>,
    pub report_service: ReportService<DbConnection>,
    pub promotion_service: PromotionService<DbConnection>,
    pub voucher_service: VoucherService<DbConnection>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

/// Open the configured database and wire up every service
pub async fn initialize_backend(settings: LedgerSettings) -> Result<AppState> {
    info!("Setting up database at {}", settings.database_url);
    let db = DbConnection::new(&settings.database_url).await?;

    Ok(build_state(db, settings))
}

pub fn build_state(db: DbConnection, settings: LedgerSettings) -> AppState {
    info!("Setting up domain services");
    let connection = Arc::new(db);
    let header = settings.voucher_header();

    AppState {
        student_service: StudentService::new(connection.clone()),
        challan_service: ChallanService::new(connection.clone()),
        report_service: ReportService::new(connection.clone()),
        promotion_service: PromotionService::new(connection.clone()),
        voucher_service: VoucherService::new(connection, header),
        renderer: Arc::new(TextRenderer),
        settings: Arc::new(settings),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // The office front end is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    io::api_router()
        .layer(cors)
        .with_state(app_state)
}
