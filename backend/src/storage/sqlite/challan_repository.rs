use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::ChallanStatus;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::{
    date_text, map_write_error, parse_date, parse_literal, parse_optional_date, DbConnection,
};
use crate::domain::models::{Challan, ChallanId, FeeLine, NewChallan};
use crate::storage::traits::{ChallanFilter, ChallanStorage};

/// Repository for challans and their line items
#[derive(Clone)]
pub struct ChallanRepository {
    db: DbConnection,
}

impl ChallanRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_challan(row: &SqliteRow) -> Result<Challan> {
        let status: Option<String> = row.try_get("status")?;
        let issue_date: String = row.try_get("issue_date")?;
        let due_date: String = row.try_get("due_date")?;

        Ok(Challan {
            id: row.try_get("challan_id")?,
            student_id: row.try_get("student_id")?,
            issue_date: parse_date("issue_date", &issue_date)?,
            due_date: parse_date("due_date", &due_date)?,
            status: parse_literal("challan status", status.as_deref().unwrap_or("Unpaid"))?,
            payment_date: parse_optional_date("payment_date", row.try_get("payment_date")?)?,
            total_amount: row.try_get::<Option<f64>, _>("total_amount")?.unwrap_or(0.0),
            arrears: row.try_get::<Option<f64>, _>("arrears")?.unwrap_or(0.0),
            fine: row.try_get::<Option<f64>, _>("fine")?.unwrap_or(0.0),
        })
    }
}

#[async_trait]
impl ChallanStorage for ChallanRepository {
    async fn insert_challan(&self, challan: &NewChallan) -> Result<ChallanId> {
        // Dropping the transaction on any early return rolls back the header row.
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO challans (student_id, issue_date, due_date, status, total_amount, arrears, fine)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(challan.student_id())
        .bind(date_text(challan.issue_date()))
        .bind(date_text(challan.due_date()))
        .bind(ChallanStatus::Unpaid.as_str())
        .bind(challan.total_amount())
        .bind(challan.arrears())
        .bind(challan.fine())
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;
        let challan_id = result.last_insert_rowid();

        for item in challan.items() {
            sqlx::query(
                r#"
                INSERT INTO challan_items (challan_id, description, amount)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(challan_id)
            .bind(&item.description)
            .bind(item.amount)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;
        Ok(challan_id)
    }

    async fn get_challan(&self, id: ChallanId) -> Result<Option<Challan>> {
        let row = sqlx::query(
            r#"
            SELECT challan_id, student_id, issue_date, due_date, status, payment_date,
                   total_amount, arrears, fine
            FROM challans
            WHERE challan_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_challan).transpose()
    }

    async fn get_challan_items(&self, id: ChallanId) -> Result<Vec<FeeLine>> {
        let rows = sqlx::query(
            r#"
            SELECT description, amount
            FROM challan_items
            WHERE challan_id = ?
            ORDER BY item_id
            "#,
        )
        .bind(id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(FeeLine {
                    description: row.try_get("description")?,
                    amount: row.try_get("amount")?,
                })
            })
            .collect()
    }

    async fn list_challans(&self, filter: &ChallanFilter) -> Result<Vec<Challan>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT challan_id, student_id, issue_date, due_date, status, payment_date,
                   total_amount, arrears, fine
            FROM challans
            WHERE 1 = 1
            "#,
        );

        if let Some(student_id) = filter.student_id {
            query.push(" AND student_id = ").push_bind(student_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some((start, end)) = filter.paid_between {
            // ISO dates sort lexicographically in calendar order
            query
                .push(" AND payment_date BETWEEN ")
                .push_bind(date_text(start))
                .push(" AND ")
                .push_bind(date_text(end));
        }
        query.push(" ORDER BY issue_date DESC, challan_id DESC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::row_to_challan).collect()
    }

    async fn update_challan_status(
        &self,
        id: ChallanId,
        status: ChallanStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE challans SET status = ?, payment_date = ?
            WHERE challan_id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(payment_date.map(date_text))
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(map_write_error)?;

        Ok(result.rows_affected() > 0)
    }
}
