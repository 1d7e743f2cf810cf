use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use super::{ChallanRepository, StudentRepository};
use crate::storage::traits::Connection;

/// DbConnection owns the SQLite pool shared by the repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Private in-memory database. A single connection that never expires
    /// keeps the data alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Column names match the school's existing database so an old
    /// `school.db` opens unchanged.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                student_id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name TEXT NOT NULL,
                date_of_birth TEXT,
                place_of_birth TEXT,
                class_into_which_admission_is_sought TEXT,
                last_school_attended TEXT,
                reason_for_leaving_last_school TEXT,
                father_name TEXT,
                father_occupation TEXT,
                father_office_address TEXT,
                mother_name TEXT,
                mother_occupation TEXT,
                mother_office_address TEXT,
                guardian_name TEXT,
                residential_address TEXT,
                contact_details TEXT,
                brothers_sisters_applicant TEXT,
                medical_info TEXT,
                admission_date TEXT,
                status TEXT DEFAULT 'Active',
                photo_path TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS challans (
                challan_id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id INTEGER NOT NULL,
                issue_date TEXT NOT NULL,
                due_date TEXT NOT NULL,
                status TEXT DEFAULT 'Unpaid',
                payment_date TEXT,
                total_amount REAL DEFAULT 0,
                arrears REAL DEFAULT 0,
                fine REAL DEFAULT 0,
                FOREIGN KEY (student_id) REFERENCES students (student_id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_challans_student_id
            ON challans(student_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS challan_items (
                item_id INTEGER PRIMARY KEY AUTOINCREMENT,
                challan_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                FOREIGN KEY (challan_id) REFERENCES challans (challan_id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_challan_items_challan_id
            ON challan_items(challan_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type StudentRepository = StudentRepository;
    type ChallanRepository = ChallanRepository;

    fn create_student_repository(&self) -> Self::StudentRepository {
        StudentRepository::new(self.clone())
    }

    fn create_challan_repository(&self) -> Self::ChallanRepository {
        ChallanRepository::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_schema_is_created() {
        let db = DbConnection::in_memory().await.expect("Failed to create test database");
        let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .unwrap();
        let tables: Vec<String> = rows.iter().map(|row| row.get("name")).collect();
        for expected in ["challan_items", "challans", "students"] {
            assert!(tables.contains(&expected.to_string()), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let db = DbConnection::in_memory().await.unwrap();
        let row = sqlx::query("PRAGMA foreign_keys").fetch_one(db.pool()).await.unwrap();
        let enabled: i64 = row.get(0);
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("school.db").display());

        let db = DbConnection::new(&url).await.unwrap();
        sqlx::query("INSERT INTO students (full_name, class_into_which_admission_is_sought) VALUES ('Ali Khan', 'Grade 3')")
            .execute(db.pool())
            .await
            .unwrap();
        db.pool().close().await;

        let reopened = DbConnection::new(&url).await.unwrap();
        let row = sqlx::query("SELECT COUNT(*) FROM students")
            .fetch_one(reopened.pool())
            .await
            .unwrap();
        let count: i64 = row.get(0);
        assert_eq!(count, 1);
    }
}
