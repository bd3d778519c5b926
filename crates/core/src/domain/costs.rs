use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostCategoryId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostEntryId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCategory {
    pub id: CostCategoryId,
    pub name: String,
    pub description: String,
}

/// A ledger row attributing a monetary cost to a category and a `YYYY-MM`
/// period. Job-linked entries survive job deletion with the reference
/// cleared, so the ledger stays historically accurate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub id: CostEntryId,
    pub category_id: CostCategoryId,
    pub amount: Decimal,
    pub period: String,
    pub job_id: Option<JobId>,
    pub note: String,
}

/// Fixed vocabulary of ledger categories materialized on job completion.
/// Names are the Italian literals reports have always grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostComponent {
    Materials,
    Energy,
    Labor,
    Depreciation,
    Consumables,
    Overhead,
    Risk,
}

impl CostComponent {
    pub fn category_name(&self) -> &'static str {
        match self {
            Self::Materials => "Materiali",
            Self::Energy => "Energia",
            Self::Labor => "Manodopera",
            Self::Depreciation => "Ammortamento",
            Self::Consumables => "Consumabili",
            Self::Overhead => "Generali",
            Self::Risk => "Rischio",
        }
    }

    pub fn category_description(&self) -> &'static str {
        match self {
            Self::Materials => "Filamento e materiali di stampa",
            Self::Energy => "Energia elettrica",
            Self::Labor => "Ore di manodopera",
            Self::Depreciation => "Usura e ammortamento macchina",
            Self::Consumables => "Consumabili fissi per pezzo",
            Self::Overhead => "Costi generali",
            Self::Risk => "Accantonamento rischio",
        }
    }
}

/// A cost entry computed by the ledger materializer but not yet persisted;
/// the persistence layer resolves the category id before insertion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostEntryDraft {
    pub component: CostComponent,
    pub amount: Decimal,
    pub period: String,
    pub job_id: JobId,
    pub note: String,
}
