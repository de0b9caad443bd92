//! SCCM flow conversion.
//!
//! The factors are fixed plant constants. Configuration picks a
//! [`FlowUnit`]; it never supplies a factor.

use nf3_common::FlowUnit;

/// SCCM to kg/s: 3.04 g per liter of NF3, 1000 cm³ per liter, 60 s per minute.
pub const SCCM_TO_KG_PER_SECOND: f64 = 3.04 / (1000.0 * 60.0);

/// SCCM to kg/day as used by the monitoring dashboard.
pub const SCCM_TO_KG_PER_DAY: f64 = (1.0 / 1_000_000.0) / 1440.0 * 3.04;

/// SCCM to L/s.
pub const SCCM_TO_LITERS_PER_SECOND: f64 = 1.0 / 60_000.0;

/// Global warming potential of NF3 (kg CO2e per kg).
pub const NF3_GWP: f64 = 17_200.0;

/// Multiplicative factor from SCCM to `unit`.
pub fn factor(unit: FlowUnit) -> f64 {
    match unit {
        FlowUnit::KgPerSecond => SCCM_TO_KG_PER_SECOND,
        FlowUnit::KgPerDay => SCCM_TO_KG_PER_DAY,
        FlowUnit::LitersPerSecond => SCCM_TO_LITERS_PER_SECOND,
        FlowUnit::Sccm => 1.0,
    }
}

/// Convert an SCCM value into `unit`. Sign and zero pass through.
pub fn convert(sccm: f64, unit: FlowUnit) -> f64 {
    sccm * factor(unit)
}

/// Inverse of [`convert`].
pub fn to_sccm(value: f64, unit: FlowUnit) -> f64 {
    value / factor(unit)
}

pub fn cost(kg: f64, price_per_kg: f64) -> f64 {
    kg * price_per_kg
}

/// CO2-equivalent mass for `kg` of gas with the given GWP.
pub fn emissions_co2e(kg: f64, gwp: f64) -> f64 {
    kg * gwp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn sixty_thousand_sccm_is_three_point_oh_four_kg() {
        assert!(close(convert(60_000.0, FlowUnit::KgPerSecond), 3.04));
        assert!(close(convert(60_000.0, FlowUnit::LitersPerSecond), 1.0));
        assert_eq!(convert(60_000.0, FlowUnit::Sccm), 60_000.0);
    }

    #[test]
    fn kg_per_day_factor() {
        assert!(close(convert(1_440_000_000.0, FlowUnit::KgPerDay), 3.04));
    }

    #[test]
    fn round_trips_every_unit() {
        for unit in FlowUnit::ALL {
            for v in [0.0, -12.5, 1.0, 123_456.789] {
                assert!(close(to_sccm(convert(v, unit), unit), v), "{unit} {v}");
            }
        }
    }

    #[test]
    fn negative_values_pass_through() {
        assert!(convert(-60_000.0, FlowUnit::KgPerSecond) < 0.0);
        assert_eq!(convert(0.0, FlowUnit::KgPerDay), 0.0);
    }

    #[test]
    fn cost_and_emissions() {
        assert_eq!(cost(2.0, 50.0), 100.0);
        assert_eq!(emissions_co2e(1.5, NF3_GWP), 25_800.0);
    }
}
