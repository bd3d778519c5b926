use thiserror::Error;

use printshop_core::errors::DomainError;

use crate::repositories::RepositoryError;

pub mod jobs;
pub mod quotes;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
