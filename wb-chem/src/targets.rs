use crate::{
    error::{BalanceError, Result},
    lsi::compute_lsi,
    sample::{ensure_finite, ensure_non_negative, PoolType, WaterSample},
};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Embedded golden numbers: `pool_type,ph,alkalinity,calcium,cya`.
pub static GOLDEN_NUMBERS_CSV: &str = include_str!("../../fixtures/golden_numbers.csv");

/// No pH target is ever set below this.
pub const PH_FLOOR: f64 = 7.2;

/// Upper end of the balanced-pH search.
pub const PH_SEARCH_CEILING: f64 = 7.8;

/// Two pH targets closer than this are the same target.
const PH_TOLERANCE: f64 = 1e-6;

/// Desired end-state chemistry.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct TargetSet {
    pub ph: f64,
    pub alkalinity: f64,
    pub calcium: f64,
    pub cya: f64,
}

/// Per-field replacements for the golden numbers. Any field set here wins.
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct TargetOverrides {
    pub ph: Option<f64>,
    pub alkalinity: Option<f64>,
    pub calcium: Option<f64>,
    pub cya: Option<f64>,
}

impl TargetOverrides {
    pub fn validate(&self) -> Result<()> {
        if let Some(ph) = self.ph {
            ensure_finite("target_ph", ph)?;
            if !(0.0..=14.0).contains(&ph) {
                return Err(BalanceError::validation(
                    "target_ph",
                    format!("{ph} is outside the 0-14 pH scale"),
                ));
            }
        }
        if let Some(alkalinity) = self.alkalinity {
            ensure_non_negative("target_alkalinity", alkalinity)?;
        }
        if let Some(calcium) = self.calcium {
            ensure_non_negative("target_calcium", calcium)?;
        }
        if let Some(cya) = self.cya {
            ensure_non_negative("target_cya", cya)?;
        }
        Ok(())
    }

    pub fn apply(&self, base: TargetSet) -> TargetSet {
        TargetSet {
            ph: self.ph.unwrap_or(base.ph),
            alkalinity: self.alkalinity.unwrap_or(base.alkalinity),
            calcium: self.calcium.unwrap_or(base.calcium),
            cya: self.cya.unwrap_or(base.cya),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoldenRow {
    pool_type: PoolType,
    ph: f64,
    alkalinity: f64,
    calcium: f64,
    cya: f64,
}

/// Standard targets keyed by pool type.
#[derive(Debug, PartialEq, Clone)]
pub struct GoldenNumbers(HashMap<PoolType, TargetSet>);

impl GoldenNumbers {
    /// The built-in table.
    pub fn embedded() -> Result<Self> {
        Self::from_csv(GOLDEN_NUMBERS_CSV)
    }

    /// Parse a golden numbers table.
    ///
    /// Expected CSV columns: pool_type, ph, alkalinity, calcium, cya
    pub fn from_csv(csv_object: &str) -> Result<Self> {
        let mut table = HashMap::new();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(csv_object.as_bytes());
        for row in rdr.deserialize() {
            let row: GoldenRow = row?;
            let targets = TargetSet {
                ph: row.ph,
                alkalinity: row.alkalinity,
                calcium: row.calcium,
                cya: row.cya,
            };
            if table.insert(row.pool_type, targets).is_some() {
                warn!("Duplicate golden numbers for {}; keeping the last row", row.pool_type);
            }
        }
        Ok(GoldenNumbers(table))
    }

    pub fn for_pool_type(&self, pool_type: PoolType) -> Result<TargetSet> {
        self.0.get(&pool_type).copied().ok_or_else(|| {
            BalanceError::Configuration(format!("no golden numbers for pool type '{pool_type}'"))
        })
    }
}

/// How the planner should move alkalinity toward its target.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum AlkalinityAction {
    /// Sodium bicarbonate, with its pH rise
    Raise,
    /// Muriatic acid
    Lower,
}

/// Targets the planner will actually dose toward, and why they moved.
#[derive(Debug, PartialEq, Clone)]
pub struct Resolution {
    pub targets: TargetSet,
    pub notes: Vec<String>,
    pub alkalinity_action: AlkalinityAction,
}

/// The pH in `PH_FLOOR..=PH_SEARCH_CEILING` (0.01 steps) whose LSI is
/// closest to zero for the given calcium and alkalinity. Lowest pH wins ties.
pub fn balanced_ph(measured: &WaterSample, calcium: f64, alkalinity: f64) -> f64 {
    let first = (PH_FLOOR * 100.0).round() as i32;
    let last = (PH_SEARCH_CEILING * 100.0).round() as i32;
    let mut best_ph = PH_FLOOR;
    let mut best_diff = f64::INFINITY;
    for hundredths in first..=last {
        let ph = f64::from(hundredths) / 100.0;
        let lsi = compute_lsi(
            ph,
            measured.temperature_f,
            calcium,
            alkalinity,
            measured.cya,
            measured.tds,
        );
        let diff = lsi.abs();
        if diff < best_diff {
            best_diff = diff;
            best_ph = ph;
        }
    }
    best_ph
}

/// Whole ppm when the reading is whole, one decimal otherwise, so a note never
/// prints two different readings as the same number.
fn format_ppm(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn enforce_ph_floor(targets: &mut TargetSet, notes: &mut Vec<String>) {
    if targets.ph < PH_FLOOR {
        notes.push(format!(
            "pH target {:.2} is below the {:.1} minimum; using {:.1} instead.",
            targets.ph, PH_FLOOR, PH_FLOOR
        ));
        targets.ph = PH_FLOOR;
    }
}

/// Merge overrides over the standard targets, then move any target the
/// measured water makes unreachable.
///
/// Calcium cannot be lowered by dosing, so a reading above target becomes
/// the target. High alkalinity is reachable with acid. In either case the
/// pH target is re-derived so the LSI at the new calcium and alkalinity
/// stays near zero, unless the caller pinned pH with an override.
pub fn resolve_targets(
    standard: &TargetSet,
    measured: &WaterSample,
    overrides: &TargetOverrides,
) -> Resolution {
    let mut targets = overrides.apply(*standard);
    let mut notes = Vec::new();

    let calcium_adjusted = measured.calcium > targets.calcium;
    if calcium_adjusted {
        debug!(
            "Calcium {} ppm exceeds target {} ppm; retargeting",
            measured.calcium, targets.calcium
        );
        notes.push(format!(
            "Calcium hardness is {} ppm, above the {} ppm target. Calcium cannot be lowered \
             by adding chemicals (only by partial drain and refill), so the target has been \
             adjusted to {} ppm.",
            format_ppm(measured.calcium),
            format_ppm(targets.calcium),
            format_ppm(measured.calcium)
        ));
        targets.calcium = measured.calcium;
    }

    let alkalinity_action = if measured.alkalinity > targets.alkalinity {
        notes.push(format!(
            "Total alkalinity is {} ppm, above the {} ppm target; muriatic acid will be \
             used to lower it.",
            format_ppm(measured.alkalinity),
            format_ppm(targets.alkalinity)
        ));
        AlkalinityAction::Lower
    } else {
        AlkalinityAction::Raise
    };

    if calcium_adjusted || alkalinity_action == AlkalinityAction::Lower {
        if overrides.ph.is_some() {
            debug!("pH target {} was overridden; not re-deriving it", targets.ph);
        } else {
            let ph = balanced_ph(measured, targets.calcium, targets.alkalinity);
            if (ph - targets.ph).abs() > PH_TOLERANCE {
                debug!("Balanced pH for resolved targets is {:.2}", ph);
                notes.push(format!(
                    "pH target adjusted from {:.2} to {:.2} to keep the LSI near 0 with calcium \
                     at {:.0} ppm and alkalinity at {:.0} ppm.",
                    targets.ph, ph, targets.calcium, targets.alkalinity
                ));
                targets.ph = ph;
            }
        }
    }

    enforce_ph_floor(&mut targets, &mut notes);

    Resolution {
        targets,
        notes,
        alkalinity_action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_targets() -> TargetSet {
        GoldenNumbers::embedded()
            .unwrap()
            .for_pool_type(PoolType::Pool)
            .unwrap()
    }

    #[test]
    fn test_embedded_golden_numbers() {
        let golden = GoldenNumbers::embedded().unwrap();
        let pool = golden.for_pool_type(PoolType::Pool).unwrap();
        assert_eq!(pool.ph, 7.5);
        assert_eq!(pool.alkalinity, 100.0);
        assert_eq!(pool.calcium, 300.0);
        assert_eq!(pool.cya, 50.0);
        let spa = golden.for_pool_type(PoolType::Spa).unwrap();
        assert_eq!(spa.alkalinity, 80.0);
        assert_eq!(spa.calcium, 200.0);
    }

    #[test]
    fn test_missing_pool_type_row() {
        let golden =
            GoldenNumbers::from_csv("pool_type,ph,alkalinity,calcium,cya\npool, 7.4, 90, 250, 40\n")
                .unwrap();
        assert_eq!(golden.for_pool_type(PoolType::Pool).unwrap().ph, 7.4);
        assert!(matches!(
            golden.for_pool_type(PoolType::Spa),
            Err(BalanceError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_golden_numbers() {
        let result =
            GoldenNumbers::from_csv("pool_type,ph,alkalinity,calcium,cya\npool,high,90,250,40\n");
        assert!(matches!(result, Err(BalanceError::CsvParse(_))));
    }

    #[test]
    fn test_overrides_win_field_by_field() {
        let overrides = TargetOverrides {
            cya: Some(70.0),
            ..Default::default()
        };
        let merged = overrides.apply(pool_targets());
        assert_eq!(merged.cya, 70.0);
        assert_eq!(merged.alkalinity, 100.0);
        assert!(overrides.validate().is_ok());

        let bad = TargetOverrides {
            calcium: Some(f64::INFINITY),
            ..Default::default()
        };
        match bad.validate() {
            Err(BalanceError::Validation { field, .. }) => assert_eq!(field, "target_calcium"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_reachable_targets_unchanged() {
        let measured = WaterSample {
            ph: 7.3,
            alkalinity: 80.0,
            calcium: 250.0,
            cya: 30.0,
            ..Default::default()
        };
        let resolution = resolve_targets(&pool_targets(), &measured, &TargetOverrides::default());
        assert_eq!(resolution.targets, pool_targets());
        assert!(resolution.notes.is_empty());
        assert_eq!(resolution.alkalinity_action, AlkalinityAction::Raise);
    }

    #[test]
    fn test_high_calcium_becomes_target() {
        let measured = WaterSample {
            calcium: 500.0,
            ..Default::default()
        };
        let resolution = resolve_targets(&pool_targets(), &measured, &TargetOverrides::default());
        assert_eq!(resolution.targets.calcium, 500.0);
        assert!(resolution.notes[0].contains("500 ppm"));
        // 500 ppm calcium -> 2.5, 83 ppm corrected alkalinity -> 2.0, 86°F -> 0.8,
        // 1600 TDS -> 12.3, so LSI = pH - 7.0 and the closest reachable pH is the floor
        assert!((resolution.targets.ph - 7.2).abs() < 1e-9);
        assert!(resolution.notes.iter().any(|n| n.contains("pH target adjusted")));
    }

    #[test]
    fn test_high_alkalinity_uses_acid() {
        let measured = WaterSample {
            alkalinity: 150.0,
            ..Default::default()
        };
        let resolution =
            resolve_targets(&pool_targets(), &measured, &TargetOverrides::default());
        assert_eq!(resolution.alkalinity_action, AlkalinityAction::Lower);
        assert_eq!(resolution.targets.alkalinity, 100.0);
        assert!(resolution.notes[0].contains("150 ppm, above the 100 ppm target"));
        assert!(resolution.notes[0].contains("muriatic acid"));
        // 300 ppm calcium -> 2.1, so LSI = pH - 7.4
        assert!((resolution.targets.ph - 7.4).abs() < 1e-9);
    }

    #[test]
    fn test_fractional_readings_keep_a_decimal() {
        let measured = WaterSample {
            alkalinity: 100.4,
            ..Default::default()
        };
        let resolution =
            resolve_targets(&pool_targets(), &measured, &TargetOverrides::default());
        assert!(resolution.notes[0].contains("100.4 ppm, above the 100 ppm target"));
    }

    #[test]
    fn test_ph_override_is_respected() {
        let measured = WaterSample {
            calcium: 500.0,
            ..Default::default()
        };
        let overrides = TargetOverrides {
            ph: Some(7.6),
            ..Default::default()
        };
        let resolution = resolve_targets(&pool_targets(), &measured, &overrides);
        assert_eq!(resolution.targets.ph, 7.6);
        assert_eq!(resolution.notes.len(), 1);
    }

    #[test]
    fn test_ph_floor_applies_to_overrides() {
        let overrides = TargetOverrides {
            ph: Some(7.0),
            ..Default::default()
        };
        let resolution =
            resolve_targets(&pool_targets(), &WaterSample::default(), &overrides);
        assert_eq!(resolution.targets.ph, PH_FLOOR);
        assert!(resolution.notes[0].contains("below the 7.2 minimum"));
    }

    #[test]
    fn test_balanced_ph_stays_in_range() {
        let measured = WaterSample {
            cya: 0.0,
            temperature_f: 104.0,
            tds: 500.0,
            ..Default::default()
        };
        // everything scales: the search bottoms out at the floor
        let ph = balanced_ph(&measured, 1000.0, 1000.0);
        assert!((ph - PH_FLOOR).abs() < 1e-9);
        // very soft, cold water: the search tops out at the ceiling
        let measured = WaterSample {
            cya: 0.0,
            temperature_f: 40.0,
            tds: 6000.0,
            ..Default::default()
        };
        let ph = balanced_ph(&measured, 10.0, 10.0);
        assert!((ph - PH_SEARCH_CEILING).abs() < 1e-9);
    }
}
