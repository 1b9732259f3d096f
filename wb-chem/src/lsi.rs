//! Langelier Saturation Index.
//!
//! The index is the measured pH plus tabulated factors for calcium hardness,
//! CYA-corrected alkalinity and temperature, minus a factor for total
//! dissolved solids. Positive values tend to scale, negative values corrode.
//!
//! Nothing here validates its inputs; a NaN reading yields a NaN index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `(threshold ppm, factor)` ascending by threshold.
const ALKALINITY_FACTORS: [(f64, f64); 13] = [
    (5.0, 0.7),
    (25.0, 1.4),
    (50.0, 1.7),
    (75.0, 1.9),
    (100.0, 2.0),
    (125.0, 2.1),
    (150.0, 2.2),
    (200.0, 2.3),
    (250.0, 2.4),
    (300.0, 2.5),
    (400.0, 2.6),
    (800.0, 2.9),
    (1000.0, 3.0),
];

/// `(threshold ppm, factor)` ascending by threshold.
const CALCIUM_FACTORS: [(f64, f64); 13] = [
    (5.0, 0.3),
    (25.0, 1.0),
    (50.0, 1.3),
    (75.0, 1.5),
    (100.0, 1.6),
    (125.0, 1.7),
    (150.0, 1.8),
    (200.0, 1.9),
    (250.0, 2.0),
    (300.0, 2.1),
    (400.0, 2.2),
    (800.0, 2.5),
    (1000.0, 2.6),
];

/// `(threshold °F, factor)` ascending by threshold.
const TEMPERATURE_FACTORS: [(f64, f64); 11] = [
    (32.0, 0.1),
    (37.0, 0.1),
    (46.0, 0.2),
    (53.0, 0.3),
    (60.0, 0.4),
    (66.0, 0.5),
    (76.0, 0.6),
    (84.0, 0.7),
    (94.0, 0.8),
    (104.0, 0.9),
    (128.0, 1.0),
];

/// Below this the water is aggressive toward plaster and metal.
pub const CORROSIVE_BELOW: f64 = -0.3;

/// Above this the water tends to deposit calcium scale.
pub const SCALING_ABOVE: f64 = 0.3;

/// Ceiling lookup: the factor of the first threshold at or above `value`,
/// or the last factor when `value` exceeds every threshold.
pub fn ceiling_lookup(table: &[(f64, f64)], value: f64) -> f64 {
    if value.is_nan() {
        return f64::NAN;
    }
    table
        .iter()
        .find(|(threshold, _)| *threshold >= value)
        .or_else(|| table.last())
        .map_or(f64::NAN, |(_, factor)| *factor)
}

pub fn alkalinity_factor(corrected_alkalinity: f64) -> f64 {
    ceiling_lookup(&ALKALINITY_FACTORS, corrected_alkalinity)
}

pub fn calcium_factor(calcium: f64) -> f64 {
    ceiling_lookup(&CALCIUM_FACTORS, calcium)
}

pub fn temperature_factor(temp_f: f64) -> f64 {
    ceiling_lookup(&TEMPERATURE_FACTORS, temp_f)
}

pub fn tds_factor(tds: f64) -> f64 {
    if tds.is_nan() {
        f64::NAN
    } else if tds <= 800.0 {
        12.1
    } else if tds <= 1500.0 {
        12.2
    } else if tds <= 2900.0 {
        12.3
    } else if tds <= 5500.0 {
        12.4
    } else {
        12.5
    }
}

/// Cyanurate contributes to a total alkalinity reading at about a third of
/// the CYA level but does not buffer like carbonate does.
pub fn corrected_alkalinity(alkalinity: f64, cya: f64) -> f64 {
    let corrected = alkalinity - cya / 3.0;
    // f64::max would swallow a NaN reading
    if corrected.is_nan() {
        return f64::NAN;
    }
    corrected.max(0.0)
}

/// Breakdown of an LSI calculation, inputs included.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct LsiFactors {
    pub lsi: f64,
    pub ph: f64,
    pub alkalinity: f64,
    pub corrected_alkalinity: f64,
    pub alkalinity_factor: f64,
    pub calcium: f64,
    pub calcium_factor: f64,
    pub temp_f: f64,
    pub temperature_factor: f64,
    pub tds: f64,
    pub tds_factor: f64,
    pub cya: f64,
}

impl LsiFactors {
    pub fn status(&self) -> LsiStatus {
        LsiStatus::classify(self.lsi)
    }
}

/// Where an index falls on the corrosive/balanced/scaling scale.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum LsiStatus {
    Corrosive,
    Balanced,
    Scaling,
}

impl LsiStatus {
    pub fn classify(lsi: f64) -> Self {
        if lsi < CORROSIVE_BELOW {
            LsiStatus::Corrosive
        } else if lsi > SCALING_ABOVE {
            LsiStatus::Scaling
        } else {
            LsiStatus::Balanced
        }
    }
}

impl fmt::Display for LsiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LsiStatus::Corrosive => "corrosive",
            LsiStatus::Balanced => "balanced",
            LsiStatus::Scaling => "scaling",
        };
        f.write_str(label)
    }
}

pub fn lsi_factors(
    ph: f64,
    temp_f: f64,
    calcium: f64,
    alkalinity: f64,
    cya: f64,
    tds: f64,
) -> LsiFactors {
    let corrected = corrected_alkalinity(alkalinity, cya);
    let alk_factor = alkalinity_factor(corrected);
    let cal_factor = calcium_factor(calcium);
    let temp_factor = temperature_factor(temp_f);
    let tds_f = tds_factor(tds);
    LsiFactors {
        lsi: ph + cal_factor + alk_factor + temp_factor - tds_f,
        ph,
        alkalinity,
        corrected_alkalinity: corrected,
        alkalinity_factor: alk_factor,
        calcium,
        calcium_factor: cal_factor,
        temp_f,
        temperature_factor: temp_factor,
        tds,
        tds_factor: tds_f,
        cya,
    }
}

pub fn compute_lsi(
    ph: f64,
    temp_f: f64,
    calcium: f64,
    alkalinity: f64,
    cya: f64,
    tds: f64,
) -> f64 {
    lsi_factors(ph, temp_f, calcium, alkalinity, cya, tds).lsi
}
