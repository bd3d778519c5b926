use thiserror::Error;

use crate::domain::filament::FilamentId;
use crate::domain::job::{JobId, JobStatus};
use crate::domain::quote::{QuoteStatus, QuoteVersionId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("filament {id:?} not found")]
    FilamentNotFound { id: FilamentId },
    #[error("quote version {id:?} not found")]
    QuoteVersionNotFound { id: QuoteVersionId },
    #[error("job {id:?} not found")]
    JobNotFound { id: JobId },
    #[error("quote version {id:?} must be ACCETTATO to start a job, found {status:?}")]
    QuoteNotAccepted { id: QuoteVersionId, status: QuoteStatus },
    #[error("invalid job transition from {from:?} to {to:?}")]
    InvalidJobTransition { from: JobStatus, to: JobStatus },
    #[error("unknown {kind} value `{value}`")]
    UnknownStatus { kind: &'static str, value: String },
}
