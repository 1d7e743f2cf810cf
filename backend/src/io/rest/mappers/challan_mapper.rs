use chrono::NaiveDate;
use shared::{BulkChallanRequest, FeeLineDto};

use crate::config::LedgerSettings;
use crate::domain::commands::challans::BulkChallanCommand;
use crate::domain::models::FeeLine;

pub struct ChallanMapper;

impl ChallanMapper {
    pub fn fee_lines_to_domain(items: Vec<FeeLineDto>) -> Vec<FeeLine> {
        items
            .into_iter()
            .map(|item| FeeLine::new(item.description, item.amount))
            .collect()
    }

    /// Fill the gaps of a bulk request from the configured fee template
    pub fn to_bulk_command(
        request: BulkChallanRequest,
        settings: &LedgerSettings,
        issue_date: NaiveDate,
    ) -> BulkChallanCommand {
        BulkChallanCommand {
            student_ids: request.student_ids,
            items: request
                .items
                .map(Self::fee_lines_to_domain)
                .unwrap_or_else(|| settings.default_fee_items.clone()),
            issue_date,
            grace_days: request.grace_days.unwrap_or(settings.due_grace_days),
        }
    }
}
