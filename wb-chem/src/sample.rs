use crate::{
    error::{BalanceError, Result},
    lsi::{lsi_factors, LsiFactors},
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Water temperature assumed when none is measured, in °F.
pub const DEFAULT_TEMPERATURE_F: f64 = 86.0;

/// Total dissolved solids assumed when none is measured, in ppm.
pub const DEFAULT_TDS: f64 = 1600.0;

/// The body of water being balanced. Golden numbers and standards are keyed by it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolType {
    Pool,
    Spa,
}

impl PoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolType::Pool => "pool",
            PoolType::Spa => "spa",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolType {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pool" => Ok(PoolType::Pool),
            "spa" => Ok(PoolType::Spa),
            other => Err(BalanceError::Configuration(format!(
                "unknown pool type '{other}' (expected 'pool' or 'spa')"
            ))),
        }
    }
}

/// A single set of test-kit readings.
///
/// All concentrations are in ppm, temperature in °F.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WaterSample {
    pub ph: f64,
    pub alkalinity: f64,
    pub calcium: f64,
    pub cya: f64,
    #[serde(default = "default_temperature_f")]
    pub temperature_f: f64,
    #[serde(default = "default_tds")]
    pub tds: f64,
    #[serde(default)]
    pub free_chlorine: Option<f64>,
    #[serde(default)]
    pub total_chlorine: Option<f64>,
}

fn default_temperature_f() -> f64 {
    DEFAULT_TEMPERATURE_F
}

fn default_tds() -> f64 {
    DEFAULT_TDS
}

impl Default for WaterSample {
    fn default() -> Self {
        Self {
            ph: 7.5,
            alkalinity: 100.0,
            calcium: 300.0,
            cya: 50.0,
            temperature_f: DEFAULT_TEMPERATURE_F,
            tds: DEFAULT_TDS,
            free_chlorine: None,
            total_chlorine: None,
        }
    }
}

impl WaterSample {
    /// Reject readings that would otherwise turn into NaN doses downstream.
    pub fn validate(&self) -> Result<()> {
        ensure_finite("ph", self.ph)?;
        if !(0.0..=14.0).contains(&self.ph) {
            return Err(BalanceError::validation(
                "ph",
                format!("{} is outside the 0-14 pH scale", self.ph),
            ));
        }
        ensure_non_negative("alkalinity", self.alkalinity)?;
        ensure_non_negative("calcium", self.calcium)?;
        ensure_non_negative("cya", self.cya)?;
        ensure_non_negative("tds", self.tds)?;
        ensure_finite("temperature_f", self.temperature_f)?;
        if !(32.0..=128.0).contains(&self.temperature_f) {
            warn!(
                "Temperature {}°F is outside the LSI table range (32-128°F)",
                self.temperature_f
            );
        }
        if let Some(free) = self.free_chlorine {
            ensure_non_negative("free_chlorine", free)?;
        }
        if let Some(total) = self.total_chlorine {
            ensure_non_negative("total_chlorine", total)?;
        }
        if let (Some(free), Some(total)) = (self.free_chlorine, self.total_chlorine) {
            if free > total {
                return Err(BalanceError::validation(
                    "total_chlorine",
                    format!("total chlorine {total} is below free chlorine {free}"),
                ));
            }
        }
        Ok(())
    }

    /// Chloramines: total minus free chlorine, when both were measured.
    pub fn combined_chlorine(&self) -> Option<f64> {
        match (self.free_chlorine, self.total_chlorine) {
            (Some(free), Some(total)) => Some((total - free).max(0.0)),
            _ => None,
        }
    }

    pub fn lsi_factors(&self) -> LsiFactors {
        lsi_factors(
            self.ph,
            self.temperature_f,
            self.calcium,
            self.alkalinity,
            self.cya,
            self.tds,
        )
    }
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BalanceError::validation(field, format!("{value} is not a number")))
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(BalanceError::validation(
            field,
            format!("{value} must not be negative"),
        ));
    }
    Ok(())
}
