use sqlx::Row;

use printshop_core::domain::filament::FilamentId;
use printshop_core::domain::job::{Job, JobConsumption, JobConsumptionId, JobId, JobStatus};
use printshop_core::domain::quote::QuoteVersionId;

use super::{parse_decimal, JobRepository, RepositoryError};
use crate::DbPool;

pub struct SqlJobRepository {
    pool: DbPool,
}

impl SqlJobRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<Job, RepositoryError> {
    Ok(Job {
        id: JobId(row.get("id")),
        quote_version_id: QuoteVersionId(row.get("quote_version_id")),
        status: row
            .get::<String, _>("status")
            .parse::<JobStatus>()
            .map_err(|error| RepositoryError::Decode(error.to_string()))?,
        quantity_produced: row.get::<i64, _>("quantity_produced") as u32,
        actual_time_min: row.get("actual_time_min"),
        energy_kwh: parse_decimal(&row.get::<String, _>("energy_kwh"), "energy_kwh")?,
        scrap_g: row.get("scrap_g"),
        note: row.get("note"),
        final_cost: parse_decimal(&row.get::<String, _>("final_cost"), "final_cost")?,
        margin: parse_decimal(&row.get::<String, _>("margin"), "margin")?,
        consumptions: Vec::new(),
    })
}

fn row_to_consumption(row: &sqlx::sqlite::SqliteRow) -> Result<JobConsumption, RepositoryError> {
    Ok(JobConsumption {
        id: JobConsumptionId(row.get("id")),
        job_id: JobId(row.get("job_id")),
        filament_id: FilamentId(row.get("filament_id")),
        weight_g: parse_decimal(&row.get::<String, _>("weight_g"), "weight_g")?,
    })
}

#[async_trait::async_trait]
impl JobRepository for SqlJobRepository {
    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let Some(row) = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let mut job = row_to_job(&row)?;

        let consumption_rows =
            sqlx::query("SELECT * FROM job_consumptions WHERE job_id = ? ORDER BY id")
                .bind(id.0)
                .fetch_all(&self.pool)
                .await?;
        job.consumptions =
            consumption_rows.iter().map(row_to_consumption).collect::<Result<_, _>>()?;

        Ok(Some(job))
    }

    async fn save(&self, job: Job) -> Result<JobId, RepositoryError> {
        if job.id.0 == 0 {
            let result = sqlx::query(
                "INSERT INTO jobs
                 (quote_version_id, status, quantity_produced, actual_time_min, energy_kwh,
                  scrap_g, note, final_cost, margin)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(job.quote_version_id.0)
            .bind(job.status.as_str())
            .bind(i64::from(job.quantity_produced))
            .bind(job.actual_time_min)
            .bind(job.energy_kwh.to_string())
            .bind(job.scrap_g)
            .bind(&job.note)
            .bind(job.final_cost.to_string())
            .bind(job.margin.to_string())
            .execute(&self.pool)
            .await?;
            Ok(JobId(result.last_insert_rowid()))
        } else {
            sqlx::query(
                "UPDATE jobs SET quote_version_id = ?, status = ?, quantity_produced = ?,
                 actual_time_min = ?, energy_kwh = ?, scrap_g = ?, note = ?,
                 final_cost = ?, margin = ? WHERE id = ?",
            )
            .bind(job.quote_version_id.0)
            .bind(job.status.as_str())
            .bind(i64::from(job.quantity_produced))
            .bind(job.actual_time_min)
            .bind(job.energy_kwh.to_string())
            .bind(job.scrap_g)
            .bind(&job.note)
            .bind(job.final_cost.to_string())
            .bind(job.margin.to_string())
            .bind(job.id.0)
            .execute(&self.pool)
            .await?;
            Ok(job.id)
        }
    }

    async fn add_consumption(
        &self,
        consumption: JobConsumption,
    ) -> Result<JobConsumptionId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO job_consumptions (job_id, filament_id, weight_g) VALUES (?, ?, ?)",
        )
        .bind(consumption.job_id.0)
        .bind(consumption.filament_id.0)
        .bind(consumption.weight_g.to_string())
        .execute(&self.pool)
        .await?;
        Ok(JobConsumptionId(result.last_insert_rowid()))
    }

    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        // Schema-level ON DELETE: consumptions cascade, cost entries get
        // their job reference nulled so the ledger keeps its history.
        sqlx::query("DELETE FROM jobs WHERE id = ?").bind(id.0).execute(&self.pool).await?;
        Ok(())
    }
}
