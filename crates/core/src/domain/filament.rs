use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilamentId(pub i64);

/// A filament spool as tracked in inventory. Pricing only reads the
/// acquisition cost and nominal weight; the rest is warehouse bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    pub id: FilamentId,
    pub material: String,
    pub brand: String,
    pub color: String,
    pub diameter_mm: Decimal,
    pub nominal_weight_g: Decimal,
    pub spool_cost: Decimal,
    pub residual_weight_g: Decimal,
}

impl Filament {
    /// Acquisition cost per gram of material. A spool with no recorded
    /// nominal weight prices at zero rather than failing the calculation.
    pub fn cost_per_gram(&self) -> Decimal {
        if self.nominal_weight_g.is_zero() {
            Decimal::ZERO
        } else {
            self.spool_cost / self.nominal_weight_g
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Filament, FilamentId};

    fn spool(spool_cost: Decimal, nominal_weight_g: Decimal) -> Filament {
        Filament {
            id: FilamentId(1),
            material: "PLA".to_string(),
            brand: "Prusament".to_string(),
            color: "Galaxy Black".to_string(),
            diameter_mm: Decimal::new(175, 2),
            nominal_weight_g,
            spool_cost,
            residual_weight_g: nominal_weight_g,
        }
    }

    #[test]
    fn cost_per_gram_divides_spool_cost_by_nominal_weight() {
        let filament = spool(Decimal::new(2000, 2), Decimal::from(1000));
        assert_eq!(filament.cost_per_gram(), Decimal::new(2, 2));
    }

    #[test]
    fn zero_nominal_weight_prices_at_zero() {
        let filament = spool(Decimal::new(2000, 2), Decimal::ZERO);
        assert_eq!(filament.cost_per_gram(), Decimal::ZERO);
    }
}
