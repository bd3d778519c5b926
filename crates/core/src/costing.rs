//! Job costing engine.
//!
//! Computes a production job's actual cost and margin against its originating
//! quote version, and on completion turns the cost breakdown into categorized
//! ledger entries.
//!
//! The job records time and energy per produced unit; every component here
//! scales by `quantity_produced`. Labor has no actual measurement of its own:
//! the per-unit figure is recovered from the quote version by dividing the
//! version-wide labor minutes by the quoted quantity.

use rust_decimal::Decimal;

use crate::domain::costs::{CostComponent, CostEntryDraft};
use crate::domain::job::Job;
use crate::domain::quote::QuoteVersion;
use crate::money;
use crate::pricing::FilamentSource;

/// The five direct cost components of a job, before overhead and risk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectCosts {
    pub material: Decimal,
    pub energy: Decimal,
    pub machine: Decimal,
    pub labor: Decimal,
    pub consumables: Decimal,
}

impl DirectCosts {
    pub fn total(&self) -> Decimal {
        self.material + self.energy + self.machine + self.labor + self.consumables
    }
}

/// Actual direct costs of a job. Consumption rows referencing a filament the
/// source cannot resolve contribute zero material cost; unlike the quoting
/// pass, costing a finished run never aborts over stale inventory.
pub fn direct_costs(
    job: &Job,
    version: &QuoteVersion,
    filaments: impl FilamentSource,
    energy_cost_override: Option<Decimal>,
) -> DirectCosts {
    // Raw, not clamped: the same quantity drives the revenue proportion, so
    // a zero-unit run costs only the material it actually consumed.
    let produced = Decimal::from(job.quantity_produced);

    let mut material = Decimal::ZERO;
    for consumption in &job.consumptions {
        if let Some(filament) = filaments.filament(consumption.filament_id) {
            material += filament.cost_per_gram() * consumption.weight_g;
        }
    }

    let total_time_min = Decimal::from(job.actual_time_min) * produced;
    let total_energy_kwh = job.energy_kwh * produced;

    let energy_rate = energy_cost_override.unwrap_or(version.energy_cost_per_kwh);
    let energy = total_energy_kwh * energy_rate;
    let machine = money::minutes_to_hours(total_time_min) * version.machine_cost_per_hour;

    let labor_min_per_unit =
        Decimal::from(version.total_labor_minutes()) / version.quoted_quantity();
    let labor =
        money::minutes_to_hours(labor_min_per_unit * produced) * version.labor_cost_per_hour;

    let consumables = version.consumables_fixed * produced;

    DirectCosts { material, energy, machine, labor, consumables }
}

/// Recompute the job's final cost and margin in place. Safe to re-run on
/// every consumption insert or job edit.
pub fn recalc_job(job: &mut Job, version: &QuoteVersion, filaments: impl FilamentSource) {
    let costs = direct_costs(job, version, filaments, None);
    let direct_total = costs.total();
    let overhead = money::apply_pct(direct_total, version.overhead_pct);
    let risk = money::apply_pct(direct_total, version.risk_pct);
    let final_cost = direct_total + overhead + risk;

    // Revenue share for partial runs: produced quantity over quoted quantity.
    let proportion = Decimal::from(job.quantity_produced) / version.quoted_quantity();
    let expected_revenue = version.taxable_total * proportion;

    job.final_cost = money::to_currency(final_cost);
    job.margin = money::to_currency(expected_revenue - final_cost);

    tracing::debug!(
        event_name = "costing.job.recalculated",
        job_id = job.id.0,
        quote_version_id = version.id.0,
        final_cost = %job.final_cost,
        margin = %job.margin,
        "job cost and margin recalculated"
    );
}

/// Build the ledger entries for a job entering the completed state: one entry
/// per nonzero direct component, plus overhead and risk on their sum.
///
/// Pure with respect to time and storage; the caller supplies the `YYYY-MM`
/// period and is responsible for the at-most-once guard and for resolving
/// category ids.
pub fn build_completion_entries(
    job: &Job,
    version: &QuoteVersion,
    filaments: impl FilamentSource,
    energy_cost_override: Option<Decimal>,
    period: &str,
) -> Vec<CostEntryDraft> {
    let costs = direct_costs(job, version, filaments, energy_cost_override);
    let direct_total = costs.total();
    let overhead = money::apply_pct(direct_total, version.overhead_pct);
    let risk = money::apply_pct(direct_total, version.risk_pct);

    let components = [
        (CostComponent::Materials, costs.material, "Materiale consumato"),
        (CostComponent::Energy, costs.energy, "Energia elettrica"),
        (CostComponent::Labor, costs.labor, "Manodopera"),
        (CostComponent::Depreciation, costs.machine, "Usura macchina"),
        (CostComponent::Consumables, costs.consumables, "Consumabili"),
        (CostComponent::Overhead, overhead, "Quota costi generali"),
        (CostComponent::Risk, risk, "Quota rischio"),
    ];

    components
        .into_iter()
        .filter(|(_, amount, _)| *amount > Decimal::ZERO)
        .map(|(component, amount, label)| CostEntryDraft {
            component,
            amount: money::to_currency(amount),
            period: period.to_string(),
            job_id: job.id,
            note: format!("{label} - job {}", job.id.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;

    use crate::domain::costs::CostComponent;
    use crate::domain::filament::{Filament, FilamentId};
    use crate::domain::job::{Job, JobConsumption, JobConsumptionId, JobId};
    use crate::domain::quote::{QuoteLine, QuoteVersion, QuoteVersionId};
    use crate::pricing::recalc_quote_version;

    use super::{build_completion_entries, recalc_job};

    fn pla_spool() -> Filament {
        Filament {
            id: FilamentId(1),
            material: "PLA".to_string(),
            brand: "Prusament".to_string(),
            color: "Galaxy Black".to_string(),
            diameter_mm: Decimal::new(175, 2),
            nominal_weight_g: Decimal::from(1000),
            spool_cost: Decimal::new(2000, 2),
            residual_weight_g: Decimal::from(750),
        }
    }

    fn catalog() -> HashMap<FilamentId, Filament> {
        let spool = pla_spool();
        HashMap::from([(spool.id, spool)])
    }

    /// A priced single-line version: qty 2, 50 g each, 60 min print,
    /// 30 min labor, the §-style cost parameters used in the pricing tests.
    fn priced_version() -> QuoteVersion {
        let mut version = QuoteVersion {
            id: QuoteVersionId(7),
            machine_cost_per_hour: Decimal::new(500, 2),
            labor_cost_per_hour: Decimal::new(1500, 2),
            power_draw_w: Decimal::from(200),
            energy_cost_per_kwh: Decimal::new(20, 2),
            consumables_fixed: Decimal::new(50, 2),
            overhead_pct: Decimal::from(10),
            risk_pct: Decimal::from(5),
            margin_pct: Decimal::from(20),
            tax_pct: Decimal::from(22),
            apply_tax: true,
            ..QuoteVersion::default()
        };
        let mut line = QuoteLine::new("bracket", 2);
        line.filament_id = Some(FilamentId(1));
        line.material_weight_g = Decimal::from(50);
        line.print_time_min = 60;
        line.labor_time_min = 30;
        version.lines.push(line);
        recalc_quote_version(&mut version, catalog()).expect("price the version");
        version
    }

    fn job_for(version: &QuoteVersion) -> Job {
        let mut job = Job::new(JobId(3), version.id);
        job.quantity_produced = 2;
        job.actual_time_min = 60; // per piece
        job.energy_kwh = Decimal::new(2, 1); // 0.2 kWh per piece
        job.consumptions.push(JobConsumption {
            id: JobConsumptionId(1),
            job_id: job.id,
            filament_id: FilamentId(1),
            weight_g: Decimal::from(100),
        });
        job
    }

    #[test]
    fn full_production_run_earns_the_full_quoted_revenue() {
        let version = priced_version();
        let mut job = job_for(&version);
        recalc_job(&mut job, &version, catalog());

        // material 2.00, energy 0.4*0.20=0.08, machine 2h*5=10.00,
        // labor (30/2)*2 min = 30 min -> 0.5h*15=7.50, consumables 1.00:
        // direct 20.58, +15% overhead+risk = 23.667 -> 23.67.
        assert_eq!(job.final_cost, Decimal::new(2367, 2));
        // proportion = 2/2 = 1, so expected revenue is the taxable total.
        assert_eq!(job.margin, version.taxable_total - job.final_cost);
    }

    #[test]
    fn half_run_scales_expected_revenue_proportionally() {
        let version = priced_version();
        let mut job = job_for(&version);
        job.quantity_produced = 1;
        job.consumptions[0].weight_g = Decimal::from(50);
        recalc_job(&mut job, &version, catalog());

        // direct: 1.00 + 0.2*0.20 + 1h*5 + 15min->0.25h*15 + 0.50 = 10.29
        // final: 10.29 * 1.15 = 11.8335 -> 11.83
        assert_eq!(job.final_cost, Decimal::new(1183, 2));
        // expected revenue = taxable_total / 2
        let expected = crate::money::to_currency(
            version.taxable_total / Decimal::from(2) - Decimal::new(118335, 4),
        );
        assert_eq!(job.margin, expected);
    }

    #[test]
    fn zero_produced_jobs_cost_only_the_consumed_material() {
        let version = priced_version();
        let mut job = job_for(&version);
        job.quantity_produced = 0;
        recalc_job(&mut job, &version, catalog());

        // Every per-unit component scales to zero; only the 2.00 of consumed
        // material remains. final = 2.00 * 1.15, and with no expected revenue
        // the margin is the full loss.
        assert_eq!(job.final_cost, Decimal::new(230, 2));
        assert_eq!(job.margin, Decimal::new(-230, 2));
    }

    #[test]
    fn recalc_job_is_idempotent() {
        let version = priced_version();
        let mut job = job_for(&version);
        recalc_job(&mut job, &version, catalog());
        let snapshot = job.clone();
        recalc_job(&mut job, &version, catalog());
        assert_eq!(job, snapshot);
    }

    #[test]
    fn unknown_consumption_filament_contributes_zero_material() {
        let version = priced_version();
        let mut job = job_for(&version);
        job.consumptions[0].filament_id = FilamentId(42);
        recalc_job(&mut job, &version, catalog());

        // Same as the full run minus the 2.00 material: 18.58 * 1.15 = 21.367
        assert_eq!(job.final_cost, Decimal::new(2137, 2));
    }

    #[test]
    fn versions_without_lines_fall_back_to_quantity_one() {
        let mut version = priced_version();
        version.lines.clear();
        version.taxable_total = Decimal::new(1000, 2);
        let mut job = job_for(&version);
        job.quantity_produced = 1;
        recalc_job(&mut job, &version, catalog());

        // No panic on the empty version; proportion is produced/1.
        assert!(job.final_cost > Decimal::ZERO);
    }

    #[test]
    fn completion_entries_cover_every_nonzero_component() {
        let version = priced_version();
        let job = job_for(&version);
        let entries = build_completion_entries(&job, &version, catalog(), None, "2026-08");

        let components: Vec<_> = entries.iter().map(|entry| entry.component).collect();
        assert_eq!(
            components,
            vec![
                CostComponent::Materials,
                CostComponent::Energy,
                CostComponent::Labor,
                CostComponent::Depreciation,
                CostComponent::Consumables,
                CostComponent::Overhead,
                CostComponent::Risk,
            ]
        );
        assert!(entries.iter().all(|entry| entry.period == "2026-08"));
        assert!(entries.iter().all(|entry| entry.job_id == job.id));

        let direct_sum: Decimal = entries
            .iter()
            .filter(|entry| {
                !matches!(entry.component, CostComponent::Overhead | CostComponent::Risk)
            })
            .map(|entry| entry.amount)
            .sum();
        assert_eq!(direct_sum, Decimal::new(2058, 2));
    }

    #[test]
    fn zero_components_are_skipped() {
        let mut version = priced_version();
        version.consumables_fixed = Decimal::ZERO;
        let mut job = job_for(&version);
        job.energy_kwh = Decimal::ZERO;
        job.consumptions.clear();
        let entries = build_completion_entries(&job, &version, catalog(), None, "2026-08");

        let components: Vec<_> = entries.iter().map(|entry| entry.component).collect();
        assert!(!components.contains(&CostComponent::Materials));
        assert!(!components.contains(&CostComponent::Energy));
        assert!(!components.contains(&CostComponent::Consumables));
        assert!(components.contains(&CostComponent::Labor));
        assert!(components.contains(&CostComponent::Depreciation));
    }

    #[test]
    fn settings_energy_override_replaces_the_version_rate() {
        let version = priced_version();
        let job = job_for(&version);
        let entries = build_completion_entries(
            &job,
            &version,
            catalog(),
            Some(Decimal::new(50, 2)),
            "2026-08",
        );

        let energy = entries
            .iter()
            .find(|entry| entry.component == CostComponent::Energy)
            .expect("energy entry");
        // 0.4 kWh at the overridden 0.50/kWh instead of 0.20/kWh.
        assert_eq!(energy.amount, Decimal::new(20, 2));
    }
}
