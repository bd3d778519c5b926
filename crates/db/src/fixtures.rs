use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const DEMO_QUOTE_CODE: &str = "Q-2026-001";
const DEMO_VERSION_ID: i64 = 1;
const DEMO_JOB_ID: i64 = 1;
const DEMO_LINE_COUNT: i64 = 2;

/// Deterministic demo dataset: one customer, one PLA spool, an accepted
/// two-line quote version with its priced breakdown, and a planned job.
pub struct DemoDataset;

/// Outcome of a seed load.
#[derive(Clone, Debug)]
pub struct SeedResult {
    pub quote_code: &'static str,
    pub quote_version_id: i64,
    pub job_id: i64,
}

/// Per-check verification outcome, keyed by a human-readable label.
#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl DemoDataset {
    /// SQL fixture content for the demo dataset.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Load the demo dataset into the database. Assumes a freshly migrated
    /// schema; re-loading over existing seed rows fails on the unique quote
    /// code.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        tracing::info!(
            event_name = "fixtures.demo.loaded",
            quote_code = DEMO_QUOTE_CODE,
            "demo dataset loaded"
        );

        Ok(SeedResult {
            quote_code: DEMO_QUOTE_CODE,
            quote_version_id: DEMO_VERSION_ID,
            job_id: DEMO_JOB_ID,
        })
    }

    /// Verify that the seed rows exist and still match the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let quote_exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quotes WHERE code = ?1)")
                .bind(DEMO_QUOTE_CODE)
                .fetch_one(pool)
                .await?;
        checks.push(("demo-quote", quote_exists == 1));

        let version_accepted: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM quote_versions WHERE id = ?1 AND status = 'ACCETTATO' AND taxable_total = '29.09')",
        )
        .bind(DEMO_VERSION_ID)
        .fetch_one(pool)
        .await?;
        checks.push(("accepted-version-totals", version_accepted == 1));

        let line_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM quote_lines WHERE quote_version_id = ?1")
                .bind(DEMO_VERSION_ID)
                .fetch_one(pool)
                .await?;
        checks.push(("version-line-count", line_count == DEMO_LINE_COUNT));

        let first_line_attributed: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM quote_lines WHERE quote_version_id = ?1 AND position = 0 AND machine_cost = '10.00' AND energy_cost = '0.08')",
        )
        .bind(DEMO_VERSION_ID)
        .fetch_one(pool)
        .await?;
        checks.push(("first-line-attribution", first_line_attributed == 1));

        let job_planned: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM jobs WHERE id = ?1 AND status = 'PIANIFICATO' AND quote_version_id = ?2)",
        )
        .bind(DEMO_JOB_ID)
        .bind(DEMO_VERSION_ID)
        .fetch_one(pool)
        .await?;
        checks.push(("planned-job", job_planned == 1));

        let filament_exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM filaments WHERE id = 1 AND spool_cost = '20.00')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("pla-spool", filament_exists == 1));

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}
