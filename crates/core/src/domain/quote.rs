use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::filament::FilamentId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteVersionId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteLineId(pub i64);

/// Quote lifecycle. Stored as the uppercase Italian literals the database
/// schema has always used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "BOZZA",
            Self::Sent => "INVIATO",
            Self::Accepted => "ACCETTATO",
            Self::Rejected => "RIFIUTATO",
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "BOZZA" => Ok(Self::Draft),
            "INVIATO" => Ok(Self::Sent),
            "ACCETTATO" => Ok(Self::Accepted),
            "RIFIUTATO" => Ok(Self::Rejected),
            other => {
                Err(DomainError::UnknownStatus { kind: "quote status", value: other.to_string() })
            }
        }
    }
}

/// Quote header. The priced parameters live on its versions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub code: String,
    pub customer_id: CustomerId,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// One revision of a quote: the full pricing configuration, the ordered line
/// items, and the computed totals the pricing engine writes back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteVersion {
    pub id: QuoteVersionId,
    pub quote_id: QuoteId,
    pub version_number: u32,
    pub status: QuoteStatus,

    // Pricing parameters
    pub machine_cost_per_hour: Decimal,
    pub labor_cost_per_hour: Decimal,
    pub power_draw_w: Decimal,
    pub energy_cost_per_kwh: Decimal,
    pub consumables_fixed: Decimal,
    pub overhead_pct: Decimal,
    pub risk_pct: Decimal,
    pub margin_pct: Decimal,
    pub discount: Decimal,
    pub tax_pct: Decimal,
    pub apply_tax: bool,
    /// When set, bypasses margin-based pricing: every line sells at this
    /// fixed per-unit price.
    pub unit_sale_price_override: Option<Decimal>,

    // Computed totals (engine output, post-discount)
    pub taxable_total: Decimal,
    pub tax_total: Decimal,
    pub gross_total: Decimal,

    /// Insertion order is significant: line 0 carries the energy and machine
    /// cost attribution for the whole print.
    pub lines: Vec<QuoteLine>,
}

impl Default for QuoteVersion {
    fn default() -> Self {
        Self {
            id: QuoteVersionId(0),
            quote_id: QuoteId(0),
            version_number: 1,
            status: QuoteStatus::Draft,
            machine_cost_per_hour: Decimal::new(8, 2),
            labor_cost_per_hour: Decimal::ZERO,
            power_draw_w: Decimal::from(200),
            energy_cost_per_kwh: Decimal::new(15, 2),
            consumables_fixed: Decimal::ZERO,
            overhead_pct: Decimal::from(10),
            risk_pct: Decimal::from(5),
            margin_pct: Decimal::from(20),
            discount: Decimal::ZERO,
            tax_pct: Decimal::from(22),
            apply_tax: true,
            unit_sale_price_override: None,
            taxable_total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            lines: Vec::new(),
        }
    }
}

impl QuoteVersion {
    /// Total quantity across all lines, with the empty-quote fallback to 1
    /// used when this version is the base of a proportional job calculation.
    pub fn quoted_quantity(&self) -> Decimal {
        let total: u64 = self.lines.iter().map(|line| u64::from(line.quantity.max(1))).sum();
        if total == 0 {
            Decimal::ONE
        } else {
            Decimal::from(total)
        }
    }

    /// Sum of labor minutes across all lines. Labor minutes are a line
    /// total, never a per-unit figure.
    pub fn total_labor_minutes(&self) -> i64 {
        self.lines.iter().map(|line| line.labor_time_min).sum()
    }
}

/// One priced item inside a quote version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub id: QuoteLineId,
    pub description: String,
    pub filament_id: Option<FilamentId>,
    pub quantity: u32,
    pub material_weight_g: Decimal,
    pub print_time_min: i64,
    pub labor_time_min: i64,

    // Computed by the pricing engine
    pub material_cost: Decimal,
    pub machine_cost: Decimal,
    pub labor_cost: Decimal,
    pub energy_cost: Decimal,
    pub consumables_cost: Decimal,
    pub line_total: Decimal,
}

impl QuoteLine {
    pub fn new(description: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: QuoteLineId(0),
            description: description.into(),
            filament_id: None,
            quantity,
            material_weight_g: Decimal::ZERO,
            print_time_min: 0,
            labor_time_min: 0,
            material_cost: Decimal::ZERO,
            machine_cost: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            energy_cost: Decimal::ZERO,
            consumables_cost: Decimal::ZERO,
            line_total: Decimal::ZERO,
        }
    }
}
