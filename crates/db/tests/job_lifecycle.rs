//! End-to-end job lifecycle against a real SQLite database: start a job from
//! the seeded accepted quote, record consumption, complete it, and check the
//! materialized ledger survives job deletion.

use chrono::Utc;
use rust_decimal::Decimal;

use printshop_core::domain::filament::FilamentId;
use printshop_core::domain::job::JobStatus;
use printshop_core::domain::quote::QuoteVersionId;
use printshop_db::connection::{connect_with_settings, DbPool};
use printshop_db::fixtures::DemoDataset;
use printshop_db::migrations::run_pending;
use printshop_db::repositories::{
    CostRepository, JobRepository, QuoteRepository, SqlCostRepository, SqlFilamentRepository,
    SqlJobRepository, SqlQuoteRepository, SqlSettingsRepository,
};
use printshop_db::services::jobs::{
    add_consumption, create_from_quote, materialize_completion_ledger, update_job, JobUpdate,
};

// One pooled connection: every connection to `sqlite::memory:` opens a
// distinct database.
async fn seeded_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    run_pending(&pool).await.expect("migrate");
    DemoDataset::load(&pool).await.expect("seed");
    pool
}

#[tokio::test]
async fn produce_complete_and_delete_a_job() {
    let pool = seeded_pool().await;
    let jobs = SqlJobRepository::new(pool.clone());
    let quotes = SqlQuoteRepository::new(pool.clone());
    let filaments = SqlFilamentRepository::new(pool.clone());
    let costs = SqlCostRepository::new(pool.clone());
    let settings = SqlSettingsRepository::new(pool.clone());

    let job = create_from_quote(&jobs, &quotes, QuoteVersionId(1)).await.expect("create job");
    assert_eq!(job.status, JobStatus::Planned);

    let job = add_consumption(&jobs, &quotes, &filaments, job.id, FilamentId(1), Decimal::from(100))
        .await
        .expect("record consumption");
    assert_eq!(job.consumptions.len(), 1);

    let job = update_job(
        &jobs,
        &quotes,
        &filaments,
        &costs,
        &settings,
        job.id,
        JobUpdate {
            status: Some(JobStatus::Completed),
            quantity_produced: Some(2),
            actual_time_min: Some(60),
            energy_kwh: Some(Decimal::new(2, 1)),
            ..JobUpdate::default()
        },
    )
    .await
    .expect("complete job");
    assert_eq!(job.status, JobStatus::Completed);

    // material 2.00 + energy 0.08 + machine 10.00 + labor 5.00 (10 min/unit
    // over a quoted quantity of 3) + consumables 1.00 = 18.08, +15%.
    assert_eq!(job.final_cost, Decimal::new(2079, 2));

    let entries = costs.entries_for_job(job.id).await.expect("entries");
    assert_eq!(entries.len(), 7);
    let total: Decimal = entries.iter().map(|entry| entry.amount).sum();
    assert_eq!(total, job.final_cost);
    assert!(entries.iter().all(|entry| entry.job_id == Some(job.id)));

    // A second materialization attempt appends nothing.
    let version = quotes
        .find_version(QuoteVersionId(1))
        .await
        .expect("query version")
        .expect("seeded version");
    let appended = materialize_completion_ledger(&costs, &settings, &job, &version, &filaments)
        .await
        .expect("retry materialization");
    assert_eq!(appended, 0);
    assert_eq!(costs.entries_for_job(job.id).await.expect("entries").len(), 7);

    // Deleting the job detaches its ledger entries instead of erasing them.
    jobs.delete(job.id).await.expect("delete job");
    assert!(jobs.find_by_id(job.id).await.expect("query").is_none());
    assert!(costs.entries_for_job(job.id).await.expect("entries").is_empty());

    let period = Utc::now().format("%Y-%m").to_string();
    let detached = costs.entries_for_period(&period).await.expect("period entries");
    assert_eq!(detached.len(), 7);
    assert!(detached.iter().all(|entry| entry.job_id.is_none()));
}

#[tokio::test]
async fn rejected_versions_cannot_start_jobs() {
    let pool = seeded_pool().await;
    let jobs = SqlJobRepository::new(pool.clone());
    let quotes = SqlQuoteRepository::new(pool.clone());

    let mut version = quotes
        .find_version(QuoteVersionId(1))
        .await
        .expect("query version")
        .expect("seeded version");
    version.status = printshop_core::domain::quote::QuoteStatus::Rejected;
    quotes.save_version(version).await.expect("save version");

    let error = create_from_quote(&jobs, &quotes, QuoteVersionId(1))
        .await
        .expect_err("rejected version");
    assert!(error.to_string().contains("ACCETTATO"));
}
