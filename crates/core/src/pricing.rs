//! Quote pricing engine.
//!
//! Given a [`QuoteVersion`] and its ordered lines, computes the per-line cost
//! breakdown and the version totals in place. Pure over its inputs: running
//! it twice with unchanged parameters produces identical output.
//!
//! Cost model, per line in stored order:
//! - material: filament cost per gram times nominal part weight, times
//!   quantity;
//! - energy and machine wear: charged only on the first line (the line that
//!   represents the printing step), scaled by that line's quantity;
//! - labor: line minutes times the hourly rate, never scaled by quantity
//!   (minutes are entered as a line total);
//! - consumables: fixed per-unit amount times quantity;
//! - overhead and risk percentages on the direct subtotal, then margin (or
//!   the version's fixed unit sale price override).
//!
//! The flat discount and the tax are applied once on the aggregate, not per
//! line. The taxable accumulator carries unquantized line prices; only the
//! stored fields are quantized to cents.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::filament::{Filament, FilamentId};
use crate::domain::quote::QuoteVersion;
use crate::errors::DomainError;
use crate::money;

/// Read-only filament lookup the engines resolve material costs through.
pub trait FilamentSource {
    fn filament(&self, id: FilamentId) -> Option<&Filament>;
}

impl FilamentSource for HashMap<FilamentId, Filament> {
    fn filament(&self, id: FilamentId) -> Option<&Filament> {
        self.get(&id)
    }
}

impl<T: FilamentSource + ?Sized> FilamentSource for &T {
    fn filament(&self, id: FilamentId) -> Option<&Filament> {
        (**self).filament(id)
    }
}

/// Recompute every line's cost breakdown and the version totals.
///
/// A line referencing a filament the source cannot resolve aborts the whole
/// pass with [`DomainError::FilamentNotFound`]; callers must not persist the
/// partially mutated version.
pub fn recalc_quote_version(
    version: &mut QuoteVersion,
    filaments: impl FilamentSource,
) -> Result<(), DomainError> {
    let machine_rate = version.machine_cost_per_hour;
    let labor_rate = version.labor_cost_per_hour;
    let power_draw_w = version.power_draw_w;
    let energy_rate = version.energy_cost_per_kwh;
    let consumables_fixed = version.consumables_fixed;
    let overhead_pct = version.overhead_pct;
    let risk_pct = version.risk_pct;
    let margin_pct = version.margin_pct;
    let price_override = version.unit_sale_price_override;

    let mut taxable = Decimal::ZERO;

    for (index, line) in version.lines.iter_mut().enumerate() {
        let qty = Decimal::from(line.quantity.max(1));

        // 1. Material, per single piece, then scaled by quantity.
        let unit_material = match line.filament_id {
            Some(id) => {
                let filament =
                    filaments.filament(id).ok_or(DomainError::FilamentNotFound { id })?;
                filament.cost_per_gram() * line.material_weight_g
            }
            None => Decimal::ZERO,
        };
        line.material_cost = money::to_currency(unit_material * qty);

        let print_hours = money::minutes_to_hours(Decimal::from(line.print_time_min));
        let labor_hours = money::minutes_to_hours(Decimal::from(line.labor_time_min));

        // 2./3. Energy and machine wear belong to the printing step, which is
        // the first line of the version. Every other line reports zero.
        let (unit_energy, unit_machine) = if index == 0 {
            let energy_kwh = power_draw_w / Decimal::from(1000) * print_hours;
            (energy_kwh * energy_rate, print_hours * machine_rate)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };
        line.energy_cost = money::to_currency(unit_energy * qty);
        line.machine_cost = money::to_currency(unit_machine * qty);

        // 4. Labor minutes are a line total: no quantity multiplier.
        let labor = labor_hours * labor_rate;
        line.labor_cost = money::to_currency(labor);

        // 5. Fixed consumables per produced unit.
        line.consumables_cost = money::to_currency(consumables_fixed * qty);

        // 6.-9. Direct subtotal, overhead, risk, then margin or override.
        let direct =
            (unit_material + unit_energy + unit_machine + consumables_fixed) * qty + labor;
        let overhead = money::apply_pct(direct, overhead_pct);
        let risk = money::apply_pct(direct, risk_pct);
        let net_cost = direct + overhead + risk;

        let line_price = match price_override {
            Some(unit_price) => unit_price * qty,
            None => net_cost * (Decimal::ONE + margin_pct / Decimal::from(100)),
        };
        line.line_total = money::to_currency(line_price);

        taxable += line_price;
    }

    // Discount applies once on the aggregate, clamped at zero.
    let mut discounted = taxable - version.discount;
    if discounted < Decimal::ZERO {
        discounted = Decimal::ZERO;
    }

    let (tax, gross) = if version.apply_tax {
        let tax = money::apply_pct(discounted, version.tax_pct);
        (tax, discounted + tax)
    } else {
        (Decimal::ZERO, discounted)
    };

    version.taxable_total = money::to_currency(discounted);
    version.tax_total = money::to_currency(tax);
    version.gross_total = money::to_currency(gross);

    tracing::debug!(
        event_name = "pricing.quote_version.recalculated",
        quote_version_id = version.id.0,
        lines = version.lines.len(),
        taxable_total = %version.taxable_total,
        gross_total = %version.gross_total,
        "quote version totals recalculated"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;

    use crate::domain::filament::{Filament, FilamentId};
    use crate::domain::quote::{QuoteLine, QuoteVersion};
    use crate::errors::DomainError;

    use super::recalc_quote_version;

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

    /// Two-line version used across these tests: line A prints two 50 g
    /// brackets in an hour with 30 minutes of finishing labor, line B is a
    /// zero-cost placeholder.
    fn worked_example() -> QuoteVersion {
        let mut version = QuoteVersion {
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

        let mut line_a = QuoteLine::new("bracket", 2);
        line_a.filament_id = Some(FilamentId(1));
        line_a.material_weight_g = Decimal::from(50);
        line_a.print_time_min = 60;
        line_a.labor_time_min = 30;
        version.lines.push(line_a);
        version.lines.push(QuoteLine::new("spare cover", 1));
        version
    }

    #[test]
    fn worked_example_breakdown_and_totals() {
        let mut version = worked_example();
        recalc_quote_version(&mut version, catalog()).expect("recalc");

        // Line A: direct = 2.00 + 0.08 + 10.00 + 7.50 + 1.00 = 20.58,
        // +10% overhead +5% risk = 23.667, +20% margin = 28.4004 -> 28.40.
        let line_a = &version.lines[0];
        assert_eq!(line_a.material_cost, Decimal::new(200, 2)); // (20/1000)*50*2
        assert_eq!(line_a.energy_cost, Decimal::new(8, 2)); // 0.2 kWh * 0.20 * 2
        assert_eq!(line_a.machine_cost, Decimal::new(1000, 2)); // 1h * 5.00 * 2
        assert_eq!(line_a.labor_cost, Decimal::new(750, 2)); // 0.5h * 15.00
        assert_eq!(line_a.consumables_cost, Decimal::new(100, 2)); // 0.50 * 2
        assert_eq!(line_a.line_total, Decimal::new(2840, 2));

        // Line B prints nothing but still carries its fixed consumables:
        // 0.50 direct, 0.575 net, 0.69 priced.
        let line_b = &version.lines[1];
        assert_eq!(line_b.material_cost, Decimal::ZERO);
        assert_eq!(line_b.energy_cost, Decimal::ZERO);
        assert_eq!(line_b.machine_cost, Decimal::ZERO);
        assert_eq!(line_b.labor_cost, Decimal::ZERO);
        assert_eq!(line_b.consumables_cost, Decimal::new(50, 2));
        assert_eq!(line_b.line_total, Decimal::new(69, 2));

        // Aggregate: 28.4004 + 0.69 = 29.0904 -> 29.09 taxable,
        // 22% tax on the unquantized sum -> 6.40, gross 35.49.
        assert_eq!(version.taxable_total, Decimal::new(2909, 2));
        assert_eq!(version.tax_total, Decimal::new(640, 2));
        assert_eq!(version.gross_total, Decimal::new(3549, 2));
    }

    #[test]
    fn recalculation_is_idempotent() {
        let mut version = worked_example();
        recalc_quote_version(&mut version, catalog()).expect("first pass");
        let snapshot = version.clone();
        recalc_quote_version(&mut version, catalog()).expect("second pass");
        assert_eq!(version, snapshot);
    }

    #[test]
    fn energy_and_machine_cost_attach_to_the_first_line_only() {
        let mut version = worked_example();
        // Give the second line print time too; it must still report zero.
        version.lines[1].print_time_min = 120;
        recalc_quote_version(&mut version, catalog()).expect("recalc");

        assert!(version.lines[0].energy_cost > Decimal::ZERO);
        assert!(version.lines[0].machine_cost > Decimal::ZERO);
        assert_eq!(version.lines[1].energy_cost, Decimal::ZERO);
        assert_eq!(version.lines[1].machine_cost, Decimal::ZERO);
    }

    #[test]
    fn discount_clamps_taxable_total_at_zero() {
        let mut version = worked_example();
        version.discount = Decimal::from(10_000);
        recalc_quote_version(&mut version, catalog()).expect("recalc");

        assert_eq!(version.taxable_total, Decimal::ZERO);
        assert_eq!(version.gross_total, Decimal::ZERO);
    }

    #[test]
    fn disabling_tax_zeroes_tax_and_matches_gross_to_taxable() {
        let mut version = worked_example();
        version.apply_tax = false;
        recalc_quote_version(&mut version, catalog()).expect("recalc");

        assert_eq!(version.tax_total, Decimal::ZERO);
        assert_eq!(version.gross_total, version.taxable_total);
    }

    #[test]
    fn fixed_sale_price_override_bypasses_margin() {
        let mut version = worked_example();
        version.unit_sale_price_override = Some(Decimal::new(1250, 2));
        recalc_quote_version(&mut version, catalog()).expect("recalc");

        // 12.50 * 2 and 12.50 * 1, regardless of cost.
        assert_eq!(version.lines[0].line_total, Decimal::new(2500, 2));
        assert_eq!(version.lines[1].line_total, Decimal::new(1250, 2));
        assert_eq!(version.taxable_total, Decimal::new(3750, 2));
    }

    #[test]
    fn missing_filament_aborts_the_whole_pass() {
        let mut version = worked_example();
        version.lines[0].filament_id = Some(FilamentId(99));
        let error =
            recalc_quote_version(&mut version, catalog()).expect_err("unknown filament");
        assert_eq!(error, DomainError::FilamentNotFound { id: FilamentId(99) });
    }

    #[test]
    fn line_without_filament_has_zero_material_cost() {
        let mut version = worked_example();
        version.lines[0].filament_id = None;
        recalc_quote_version(&mut version, catalog()).expect("recalc");
        assert_eq!(version.lines[0].material_cost, Decimal::ZERO);
    }
}
