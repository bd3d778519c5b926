use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::filament::FilamentId;
use crate::domain::quote::QuoteVersionId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobConsumptionId(pub i64);

/// Production job lifecycle, stored as the uppercase Italian literals of the
/// schema. `Completed` is terminal: entering it materializes the cost ledger
/// exactly once. `Cancelled` is reachable from any non-completed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PIANIFICATO",
            Self::InProgress => "IN_CORSO",
            Self::Completed => "COMPLETATO",
            Self::Cancelled => "ANNULLATO",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PIANIFICATO" => Ok(Self::Planned),
            "IN_CORSO" => Ok(Self::InProgress),
            "COMPLETATO" => Ok(Self::Completed),
            "ANNULLATO" => Ok(Self::Cancelled),
            other => {
                Err(DomainError::UnknownStatus { kind: "job status", value: other.to_string() })
            }
        }
    }
}

/// A production run created from an accepted quote version. Time and energy
/// consumption are recorded per produced unit; costing scales them by
/// `quantity_produced`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub quote_version_id: QuoteVersionId,
    pub status: JobStatus,
    pub quantity_produced: u32,
    pub actual_time_min: i64,
    pub energy_kwh: Decimal,
    pub scrap_g: i64,
    pub note: String,

    // Computed by the costing engine
    pub final_cost: Decimal,
    pub margin: Decimal,

    pub consumptions: Vec<JobConsumption>,
}

impl Job {
    pub fn new(id: JobId, quote_version_id: QuoteVersionId) -> Self {
        Self {
            id,
            quote_version_id,
            status: JobStatus::Planned,
            quantity_produced: 1,
            actual_time_min: 0,
            energy_kwh: Decimal::ZERO,
            scrap_g: 0,
            note: String::new(),
            final_cost: Decimal::ZERO,
            margin: Decimal::ZERO,
            consumptions: Vec::new(),
        }
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (&self.status, next),
            (JobStatus::Planned, JobStatus::InProgress)
                | (JobStatus::Planned, JobStatus::Completed)
                | (JobStatus::InProgress, JobStatus::Completed)
                | (JobStatus::Planned, JobStatus::Cancelled)
                | (JobStatus::InProgress, JobStatus::Cancelled)
        )
    }

    pub fn transition_to(&mut self, next: JobStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidJobTransition { from: self.status, to: next })
    }
}

/// Actual filament usage recorded against a job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobConsumption {
    pub id: JobConsumptionId,
    pub job_id: JobId,
    pub filament_id: FilamentId,
    pub weight_g: Decimal,
}
