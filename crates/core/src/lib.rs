pub mod config;
pub mod costing;
pub mod domain;
pub mod errors;
pub mod money;
pub mod pricing;

pub use costing::{build_completion_entries, direct_costs, recalc_job, DirectCosts};
pub use domain::costs::{
    CostCategory, CostCategoryId, CostComponent, CostEntry, CostEntryDraft, CostEntryId,
};
pub use domain::customer::{Customer, CustomerId};
pub use domain::filament::{Filament, FilamentId};
pub use domain::job::{Job, JobConsumption, JobConsumptionId, JobId, JobStatus};
pub use domain::quote::{
    Quote, QuoteId, QuoteLine, QuoteLineId, QuoteStatus, QuoteVersion, QuoteVersionId,
};
pub use errors::DomainError;
pub use pricing::{recalc_quote_version, FilamentSource};
