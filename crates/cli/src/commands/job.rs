use rust_decimal::Decimal;

use printshop_core::domain::job::{JobId, JobStatus};
use printshop_db::repositories::{
    SqlCostRepository, SqlFilamentRepository, SqlJobRepository, SqlQuoteRepository,
    SqlSettingsRepository,
};
use printshop_db::services::jobs::{update_job, JobUpdate};

use crate::commands::{with_pool, CommandResult};

use super::quote::service_failure;

#[derive(Debug)]
pub struct CompleteArgs {
    pub job_id: i64,
    pub produced: Option<u32>,
    pub time_min: Option<i64>,
    pub energy_kwh: Option<Decimal>,
    pub scrap_g: Option<i64>,
    pub note: Option<String>,
}

pub fn complete(args: CompleteArgs) -> CommandResult {
    let job_id = args.job_id;
    let result = with_pool("job-complete", |pool| async move {
        let jobs = SqlJobRepository::new(pool.clone());
        let quotes = SqlQuoteRepository::new(pool.clone());
        let filaments = SqlFilamentRepository::new(pool.clone());
        let costs = SqlCostRepository::new(pool.clone());
        let settings = SqlSettingsRepository::new(pool);

        update_job(
            &jobs,
            &quotes,
            &filaments,
            &costs,
            &settings,
            JobId(args.job_id),
            JobUpdate {
                status: Some(JobStatus::Completed),
                quantity_produced: args.produced,
                actual_time_min: args.time_min,
                energy_kwh: args.energy_kwh,
                scrap_g: args.scrap_g,
                note: args.note,
            },
        )
        .await
        .map_err(service_failure)
    });

    match result {
        Ok(job) => CommandResult::success(
            "job-complete",
            format!(
                "job {} completed: final cost {} / margin {}; cost ledger up to date",
                job_id, job.final_cost, job.margin
            ),
        ),
        Err(failure) => failure,
    }
}
