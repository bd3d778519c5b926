use chrono::Utc;
use rust_decimal::Decimal;

use printshop_core::costing::{build_completion_entries, recalc_job};
use printshop_core::domain::costs::{CostEntry, CostEntryId};
use printshop_core::domain::filament::FilamentId;
use printshop_core::domain::job::{Job, JobConsumption, JobConsumptionId, JobId, JobStatus};
use printshop_core::domain::quote::{QuoteStatus, QuoteVersion, QuoteVersionId};
use printshop_core::errors::DomainError;

use super::quotes::filament_index;
use super::ServiceError;
use crate::repositories::{
    CostRepository, FilamentRepository, JobRepository, QuoteRepository, SettingsRepository,
};

/// Explicit field-by-field merge for job updates; absent fields keep their
/// stored value.
#[derive(Clone, Debug, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub quantity_produced: Option<u32>,
    pub actual_time_min: Option<i64>,
    pub energy_kwh: Option<Decimal>,
    pub scrap_g: Option<i64>,
    pub note: Option<String>,
}

/// Start a production job from a quote version. Only accepted versions can
/// be produced.
pub async fn create_from_quote(
    jobs: &impl JobRepository,
    quotes: &impl QuoteRepository,
    version_id: QuoteVersionId,
) -> Result<Job, ServiceError> {
    let version = quotes
        .find_version(version_id)
        .await?
        .ok_or(DomainError::QuoteVersionNotFound { id: version_id })?;

    if version.status != QuoteStatus::Accepted {
        return Err(
            DomainError::QuoteNotAccepted { id: version_id, status: version.status }.into()
        );
    }

    let mut job = Job::new(JobId(0), version_id);
    job.id = jobs.save(job.clone()).await?;

    tracing::info!(
        event_name = "service.job.created",
        job_id = job.id.0,
        quote_version_id = version_id.0,
        "job created from accepted quote version"
    );

    Ok(job)
}

/// Apply a partial update, recalculate cost and margin, and persist.
/// Completed jobs additionally materialize the cost ledger, guarded to run
/// at most once per job.
pub async fn update_job(
    jobs: &impl JobRepository,
    quotes: &impl QuoteRepository,
    filaments: &impl FilamentRepository,
    costs: &impl CostRepository,
    settings: &impl SettingsRepository,
    job_id: JobId,
    update: JobUpdate,
) -> Result<Job, ServiceError> {
    let mut job =
        jobs.find_by_id(job_id).await?.ok_or(DomainError::JobNotFound { id: job_id })?;

    if let Some(next) = update.status {
        if next != job.status {
            job.transition_to(next)?;
        }
    }
    if let Some(quantity_produced) = update.quantity_produced {
        job.quantity_produced = quantity_produced;
    }
    if let Some(actual_time_min) = update.actual_time_min {
        job.actual_time_min = actual_time_min;
    }
    if let Some(energy_kwh) = update.energy_kwh {
        job.energy_kwh = energy_kwh;
    }
    if let Some(scrap_g) = update.scrap_g {
        job.scrap_g = scrap_g;
    }
    if let Some(note) = update.note {
        job.note = note;
    }

    let version = quotes
        .find_version(job.quote_version_id)
        .await?
        .ok_or(DomainError::QuoteVersionNotFound { id: job.quote_version_id })?;
    let index =
        filament_index(filaments, job.consumptions.iter().map(|c| c.filament_id)).await?;

    recalc_job(&mut job, &version, &index);
    jobs.save(job.clone()).await?;

    // Runs on every completed save, not just the status edge: if a ledger
    // append failed after the job was stored COMPLETATO, the next update
    // retries it. The entries guard keeps it at-most-once.
    if job.status == JobStatus::Completed {
        materialize_completion_ledger(costs, settings, &job, &version, filaments).await?;
    }

    Ok(job)
}

/// Record actual filament usage against a job and refresh its costing.
pub async fn add_consumption(
    jobs: &impl JobRepository,
    quotes: &impl QuoteRepository,
    filaments: &impl FilamentRepository,
    job_id: JobId,
    filament_id: FilamentId,
    weight_g: Decimal,
) -> Result<Job, ServiceError> {
    let job = jobs.find_by_id(job_id).await?.ok_or(DomainError::JobNotFound { id: job_id })?;
    if filaments.find_by_id(filament_id).await?.is_none() {
        return Err(DomainError::FilamentNotFound { id: filament_id }.into());
    }

    jobs.add_consumption(JobConsumption {
        id: JobConsumptionId(0),
        job_id: job.id,
        filament_id,
        weight_g,
    })
    .await?;

    // Reload so the recalc sees the new consumption row.
    let mut job =
        jobs.find_by_id(job_id).await?.ok_or(DomainError::JobNotFound { id: job_id })?;
    let version = quotes
        .find_version(job.quote_version_id)
        .await?
        .ok_or(DomainError::QuoteVersionNotFound { id: job.quote_version_id })?;
    let index =
        filament_index(filaments, job.consumptions.iter().map(|c| c.filament_id)).await?;

    recalc_job(&mut job, &version, &index);
    jobs.save(job.clone()).await?;

    Ok(job)
}

/// Turn a completed job's cost breakdown into ledger entries, at most once:
/// a job that already has entries is left untouched, so retries are safe.
pub async fn materialize_completion_ledger(
    costs: &impl CostRepository,
    settings: &impl SettingsRepository,
    job: &Job,
    version: &QuoteVersion,
    filaments: &impl FilamentRepository,
) -> Result<usize, ServiceError> {
    if costs.has_entries_for_job(job.id).await? {
        tracing::debug!(
            event_name = "service.job.ledger_skipped",
            job_id = job.id.0,
            "cost entries already exist for job, skipping materialization"
        );
        return Ok(0);
    }

    let energy_override = settings.energy_cost_override().await?;
    let period = Utc::now().format("%Y-%m").to_string();
    let index =
        filament_index(filaments, job.consumptions.iter().map(|c| c.filament_id)).await?;
    let drafts = build_completion_entries(job, version, &index, energy_override, &period);
    let count = drafts.len();

    for draft in drafts {
        let category = costs
            .get_or_create_category(
                draft.component.category_name(),
                draft.component.category_description(),
            )
            .await?;
        costs
            .append(CostEntry {
                id: CostEntryId(0),
                category_id: category.id,
                amount: draft.amount,
                period: draft.period,
                job_id: Some(draft.job_id),
                note: draft.note,
            })
            .await?;
    }

    tracing::info!(
        event_name = "service.job.ledger_materialized",
        job_id = job.id.0,
        entries = count,
        "completion cost entries appended"
    );

    Ok(count)
}
