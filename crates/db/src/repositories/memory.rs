use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use printshop_core::domain::costs::{CostCategory, CostCategoryId, CostEntry, CostEntryId};
use printshop_core::domain::filament::{Filament, FilamentId};
use printshop_core::domain::job::{Job, JobConsumption, JobConsumptionId, JobId};
use printshop_core::domain::quote::{Quote, QuoteId, QuoteVersion, QuoteVersionId};

use super::{
    CostRepository, FilamentRepository, JobRepository, QuoteRepository, RepositoryError,
    SettingsRepository,
};

fn next_id(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::Relaxed)
}

#[derive(Default)]
pub struct InMemoryFilamentRepository {
    filaments: RwLock<HashMap<i64, Filament>>,
    next: AtomicI64,
}

impl InMemoryFilamentRepository {
    pub fn new() -> Self {
        Self { filaments: RwLock::default(), next: AtomicI64::new(1) }
    }
}

#[async_trait::async_trait]
impl FilamentRepository for InMemoryFilamentRepository {
    async fn find_by_id(&self, id: FilamentId) -> Result<Option<Filament>, RepositoryError> {
        Ok(self.filaments.read().await.get(&id.0).cloned())
    }

    async fn list(&self) -> Result<Vec<Filament>, RepositoryError> {
        let mut filaments: Vec<_> = self.filaments.read().await.values().cloned().collect();
        filaments.sort_by_key(|filament| filament.id.0);
        Ok(filaments)
    }

    async fn save(&self, mut filament: Filament) -> Result<FilamentId, RepositoryError> {
        if filament.id.0 == 0 {
            filament.id = FilamentId(next_id(&self.next));
        }
        let id = filament.id;
        self.filaments.write().await.insert(id.0, filament);
        Ok(id)
    }
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<HashMap<i64, Quote>>,
    versions: RwLock<HashMap<i64, QuoteVersion>>,
    next: AtomicI64,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self { quotes: RwLock::default(), versions: RwLock::default(), next: AtomicI64::new(1) }
    }
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn find_quote(&self, id: QuoteId) -> Result<Option<Quote>, RepositoryError> {
        Ok(self.quotes.read().await.get(&id.0).cloned())
    }

    async fn save_quote(&self, mut quote: Quote) -> Result<QuoteId, RepositoryError> {
        if quote.id.0 == 0 {
            quote.id = QuoteId(next_id(&self.next));
        }
        let id = quote.id;
        self.quotes.write().await.insert(id.0, quote);
        Ok(id)
    }

    async fn find_version(
        &self,
        id: QuoteVersionId,
    ) -> Result<Option<QuoteVersion>, RepositoryError> {
        Ok(self.versions.read().await.get(&id.0).cloned())
    }

    async fn save_version(
        &self,
        mut version: QuoteVersion,
    ) -> Result<QuoteVersionId, RepositoryError> {
        if version.id.0 == 0 {
            version.id = QuoteVersionId(next_id(&self.next));
        }
        let id = version.id;
        self.versions.write().await.insert(id.0, version);
        Ok(id)
    }
}

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<i64, Job>>,
    next: AtomicI64,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self { jobs: RwLock::default(), next: AtomicI64::new(1) }
    }
}

#[async_trait::async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id.0).cloned())
    }

    async fn save(&self, mut job: Job) -> Result<JobId, RepositoryError> {
        if job.id.0 == 0 {
            job.id = JobId(next_id(&self.next));
        }
        let id = job.id;
        self.jobs.write().await.insert(id.0, job);
        Ok(id)
    }

    async fn add_consumption(
        &self,
        mut consumption: JobConsumption,
    ) -> Result<JobConsumptionId, RepositoryError> {
        consumption.id = JobConsumptionId(next_id(&self.next));
        let id = consumption.id;
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&consumption.job_id.0) {
            job.consumptions.push(consumption);
        }
        Ok(id)
    }

    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        self.jobs.write().await.remove(&id.0);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCostRepository {
    categories: RwLock<HashMap<i64, CostCategory>>,
    entries: RwLock<Vec<CostEntry>>,
    next: AtomicI64,
}

impl InMemoryCostRepository {
    pub fn new() -> Self {
        Self { categories: RwLock::default(), entries: RwLock::default(), next: AtomicI64::new(1) }
    }
}

#[async_trait::async_trait]
impl CostRepository for InMemoryCostRepository {
    async fn get_or_create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CostCategory, RepositoryError> {
        let mut categories = self.categories.write().await;
        if let Some(existing) = categories.values().find(|category| category.name == name) {
            return Ok(existing.clone());
        }
        let category = CostCategory {
            id: CostCategoryId(next_id(&self.next)),
            name: name.to_string(),
            description: description.to_string(),
        };
        categories.insert(category.id.0, category.clone());
        Ok(category)
    }

    async fn has_entries_for_job(&self, job_id: JobId) -> Result<bool, RepositoryError> {
        Ok(self.entries.read().await.iter().any(|entry| entry.job_id == Some(job_id)))
    }

    async fn append(&self, mut entry: CostEntry) -> Result<CostEntryId, RepositoryError> {
        entry.id = CostEntryId(next_id(&self.next));
        let id = entry.id;
        self.entries.write().await.push(entry);
        Ok(id)
    }

    async fn entries_for_job(&self, job_id: JobId) -> Result<Vec<CostEntry>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.job_id == Some(job_id))
            .cloned()
            .collect())
    }

    async fn entries_for_period(&self, period: &str) -> Result<Vec<CostEntry>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.period == period)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemorySettingsRepository {
    energy_cost_override: RwLock<Option<Decimal>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn energy_cost_override(&self) -> Result<Option<Decimal>, RepositoryError> {
        Ok(*self.energy_cost_override.read().await)
    }

    async fn set_energy_cost_override(
        &self,
        value: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        *self.energy_cost_override.write().await = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use printshop_core::domain::filament::{Filament, FilamentId};
    use printshop_core::domain::job::{Job, JobConsumption, JobConsumptionId, JobId};
    use printshop_core::domain::quote::{QuoteLine, QuoteVersion, QuoteVersionId};

    use crate::repositories::{
        CostRepository, FilamentRepository, InMemoryCostRepository, InMemoryFilamentRepository,
        InMemoryJobRepository, InMemoryQuoteRepository, JobRepository, QuoteRepository,
    };

    fn spool() -> Filament {
        Filament {
            id: FilamentId(0),
            material: "PETG".to_string(),
            brand: "eSun".to_string(),
            color: "Clear".to_string(),
            diameter_mm: Decimal::new(175, 2),
            nominal_weight_g: Decimal::from(1000),
            spool_cost: Decimal::new(1850, 2),
            residual_weight_g: Decimal::from(1000),
        }
    }

    #[tokio::test]
    async fn filament_repo_assigns_ids_and_round_trips() {
        let repo = InMemoryFilamentRepository::new();
        let id = repo.save(spool()).await.expect("save");
        assert_ne!(id.0, 0);

        let found = repo.find_by_id(id).await.expect("find").expect("present");
        assert_eq!(found.material, "PETG");
    }

    #[tokio::test]
    async fn quote_version_round_trips_with_lines() {
        let repo = InMemoryQuoteRepository::new();
        let mut version = QuoteVersion::default();
        version.lines.push(QuoteLine::new("bracket", 2));

        let id = repo.save_version(version.clone()).await.expect("save");
        let found = repo.find_version(id).await.expect("find").expect("present");
        assert_eq!(found.lines.len(), 1);
    }

    #[tokio::test]
    async fn consumptions_attach_to_their_job() {
        let jobs = InMemoryJobRepository::new();
        let job_id =
            jobs.save(Job::new(JobId(0), QuoteVersionId(1))).await.expect("save job");

        jobs.add_consumption(JobConsumption {
            id: JobConsumptionId(0),
            job_id,
            filament_id: FilamentId(1),
            weight_g: Decimal::from(80),
        })
        .await
        .expect("add consumption");

        let job = jobs.find_by_id(job_id).await.expect("find").expect("present");
        assert_eq!(job.consumptions.len(), 1);
    }

    #[tokio::test]
    async fn categories_are_created_once_per_name() {
        let costs = InMemoryCostRepository::new();
        let first = costs.get_or_create_category("Materiali", "").await.expect("create");
        let second = costs.get_or_create_category("Materiali", "").await.expect("lookup");
        assert_eq!(first.id, second.id);
    }
}
