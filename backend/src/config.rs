//! Ledger settings stored as YAML next to the database.
//!
//! A missing file is created with defaults on first start so the office can
//! edit the bank details and fee template by hand.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::models::{validate_fee_lines, FeeLine};
use crate::domain::voucher::VoucherHeader;

/// Environment variable naming the settings file
pub const CONFIG_ENV_VAR: &str = "SCHOOL_LEDGER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "school_ledger.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub school_name: String,
    pub campus_name: String,
    pub bank_branch: String,
    pub bank_account: String,
    /// Display only, never stored with amounts
    pub currency_symbol: String,
    pub database_url: String,
    pub bind_address: String,
    /// Days between issue and due date for class-wide generation
    pub due_grace_days: i64,
    pub default_fee_items: Vec<FeeLine>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            school_name: "IIUI SCHOOLS".to_string(),
            campus_name: "Ali Pur Chattha Campus".to_string(),
            bank_branch: "HBL P.M.C Branch, Faisalabad".to_string(),
            bank_account: "13497901233403".to_string(),
            currency_symbol: "Rs.".to_string(),
            database_url: "sqlite:school.db".to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            due_grace_days: 15,
            default_fee_items: vec![FeeLine::new("Tuition Fee", 5000.0)],
        }
    }
}

impl LedgerSettings {
    /// Path from `SCHOOL_LEDGER_CONFIG`, or `school_ledger.yaml` in the
    /// working directory
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Read and validate the settings file, writing defaults when absent
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings file at {:?}, writing defaults", path);
            let settings = Self::default();
            settings.save(path)?;
            return Ok(settings);
        }

        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        let settings: LedgerSettings = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))?;
        settings.validate()?;

        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let yaml_content = serde_yaml::to_string(self)?;

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.due_grace_days < 0 {
            bail!("due_grace_days cannot be negative, got {}", self.due_grace_days);
        }
        if self.default_fee_items.is_empty() {
            bail!("default_fee_items must list at least one fee");
        }
        validate_fee_lines(&self.default_fee_items)
            .map_err(|e| anyhow::anyhow!("default_fee_items: {}", e))?;
        if self.database_url.trim().is_empty() {
            bail!("database_url cannot be empty");
        }
        Ok(())
    }

    pub fn voucher_header(&self) -> VoucherHeader {
        VoucherHeader {
            school_name: self.school_name.clone(),
            campus_name: self.campus_name.clone(),
            bank_branch: self.bank_branch.clone(),
            bank_account: self.bank_account.clone(),
            currency_symbol: self.currency_symbol.clone(),
        }
    }
}
