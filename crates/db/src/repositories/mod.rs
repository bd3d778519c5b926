use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use printshop_core::domain::costs::{CostCategory, CostEntry, CostEntryId};
use printshop_core::domain::filament::{Filament, FilamentId};
use printshop_core::domain::job::{Job, JobConsumption, JobConsumptionId, JobId};
use printshop_core::domain::quote::{Quote, QuoteId, QuoteVersion, QuoteVersionId};

pub mod cost;
pub mod filament;
pub mod job;
pub mod memory;
pub mod quote;
pub mod settings;

pub use cost::SqlCostRepository;
pub use filament::SqlFilamentRepository;
pub use job::SqlJobRepository;
pub use memory::{
    InMemoryCostRepository, InMemoryFilamentRepository, InMemoryJobRepository,
    InMemoryQuoteRepository, InMemorySettingsRepository,
};
pub use quote::SqlQuoteRepository;
pub use settings::SqlSettingsRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

pub(crate) fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, RepositoryError> {
    raw.parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("column {column}: {error}")))
}

#[async_trait]
pub trait FilamentRepository: Send + Sync {
    async fn find_by_id(&self, id: FilamentId) -> Result<Option<Filament>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Filament>, RepositoryError>;
    /// Insert (id 0) or replace; returns the stored id.
    async fn save(&self, filament: Filament) -> Result<FilamentId, RepositoryError>;
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn find_quote(&self, id: QuoteId) -> Result<Option<Quote>, RepositoryError>;
    async fn save_quote(&self, quote: Quote) -> Result<QuoteId, RepositoryError>;
    /// Loads the version together with its lines in stored position order.
    async fn find_version(
        &self,
        id: QuoteVersionId,
    ) -> Result<Option<QuoteVersion>, RepositoryError>;
    /// Upserts the version (parameters and computed totals) and replaces its
    /// line set, preserving the in-memory order as stored positions.
    async fn save_version(&self, version: QuoteVersion)
        -> Result<QuoteVersionId, RepositoryError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Loads the job together with its consumption records.
    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    async fn save(&self, job: Job) -> Result<JobId, RepositoryError>;
    async fn add_consumption(
        &self,
        consumption: JobConsumption,
    ) -> Result<JobConsumptionId, RepositoryError>;
    /// Deletes the job and its consumptions. Cost entries referencing the
    /// job are detached, never deleted.
    async fn delete(&self, id: JobId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CostRepository: Send + Sync {
    async fn get_or_create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CostCategory, RepositoryError>;
    async fn has_entries_for_job(&self, job_id: JobId) -> Result<bool, RepositoryError>;
    async fn append(&self, entry: CostEntry) -> Result<CostEntryId, RepositoryError>;
    async fn entries_for_job(&self, job_id: JobId) -> Result<Vec<CostEntry>, RepositoryError>;
    async fn entries_for_period(&self, period: &str) -> Result<Vec<CostEntry>, RepositoryError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Shop-wide energy unit cost override consumed by ledger
    /// materialization; `None` falls back to the quote version's own rate.
    async fn energy_cost_override(&self) -> Result<Option<Decimal>, RepositoryError>;
    async fn set_energy_cost_override(
        &self,
        value: Option<Decimal>,
    ) -> Result<(), RepositoryError>;
}
