use sqlx::Row;

use printshop_core::domain::costs::{CostCategory, CostCategoryId, CostEntry, CostEntryId};
use printshop_core::domain::job::JobId;

use super::{parse_decimal, CostRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCostRepository {
    pool: DbPool,
}

impl SqlCostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<CostEntry, RepositoryError> {
    Ok(CostEntry {
        id: CostEntryId(row.get("id")),
        category_id: CostCategoryId(row.get("category_id")),
        amount: parse_decimal(&row.get::<String, _>("amount"), "amount")?,
        period: row.get("period"),
        job_id: row.get::<Option<i64>, _>("job_id").map(JobId),
        note: row.get("note"),
    })
}

#[async_trait::async_trait]
impl CostRepository for SqlCostRepository {
    async fn get_or_create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CostCategory, RepositoryError> {
        if let Some(row) = sqlx::query("SELECT * FROM cost_categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(CostCategory {
                id: CostCategoryId(row.get("id")),
                name: row.get("name"),
                description: row.get("description"),
            });
        }

        let result = sqlx::query("INSERT INTO cost_categories (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await?;

        Ok(CostCategory {
            id: CostCategoryId(result.last_insert_rowid()),
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    async fn has_entries_for_job(&self, job_id: JobId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM cost_entries WHERE job_id = ?")
            .bind(job_id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn append(&self, entry: CostEntry) -> Result<CostEntryId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO cost_entries (category_id, amount, period, job_id, note)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.category_id.0)
        .bind(entry.amount.to_string())
        .bind(&entry.period)
        .bind(entry.job_id.map(|id| id.0))
        .bind(&entry.note)
        .execute(&self.pool)
        .await?;
        Ok(CostEntryId(result.last_insert_rowid()))
    }

    async fn entries_for_job(&self, job_id: JobId) -> Result<Vec<CostEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM cost_entries WHERE job_id = ? ORDER BY id")
            .bind(job_id.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn entries_for_period(&self, period: &str) -> Result<Vec<CostEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM cost_entries WHERE period = ? ORDER BY id")
            .bind(period)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_entry).collect()
    }
}
