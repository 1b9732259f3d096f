//! Single-parameter dose formulas.
//!
//! Each formula only doses in the direction it corrects: raising formulas
//! return `None` when the target is at or below the current reading, lowering
//! formulas when the current reading is at or below the target. A computed
//! amount that is not positive is also `None` rather than a zero dose.

use crate::error::{BalanceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use wb_utils::units::{format_dry_ounces, format_fluid_ounces, format_pounds, volume_factor};

/// Stabilizer: ounces per 10,000 gallons per 10 ppm CYA.
pub const STABILIZER_OZ_PER_10PPM: f64 = 13.0;

/// Sodium bicarbonate: pounds per 10,000 gallons per 10 ppm alkalinity.
pub const BICARBONATE_LBS_PER_10PPM: f64 = 1.5;

/// Calcium chloride: pounds per 10,000 gallons per 10 ppm hardness.
pub const CALCIUM_CHLORIDE_LBS_PER_10PPM: f64 = 1.25;

/// Muriatic acid (31.45%): fluid ounces per 10,000 gallons per 10 ppm alkalinity drop.
pub const ACID_FLOZ_PER_10PPM_ALKALINITY: f64 = 51.2;

/// Muriatic acid (31.45%): fluid ounces per 10,000 gallons per 1.0 pH drop at 100 ppm alkalinity.
pub const ACID_FLOZ_PER_PH: f64 = 76.0;

/// Soda ash: ounces per 10,000 gallons per 0.2 pH rise.
pub const SODA_ASH_OZ_PER_0_2_PH: f64 = 6.0;

/// Alkalinity-lowering acid doses below this are not worth measuring out.
pub const MIN_ALKALINITY_ACID_FLOZ: f64 = 1.0;

/// Strength of the muriatic acid product, as percent hydrochloric acid.
/// Acid volumes are quoted for 31.45% and scale inversely with strength.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct AcidStrength(f64);

impl AcidStrength {
    pub const STANDARD: AcidStrength = AcidStrength(31.45);

    pub fn new(percent: f64) -> Result<Self> {
        if percent.is_finite() && percent > 0.0 && percent <= 100.0 {
            Ok(AcidStrength(percent))
        } else {
            Err(BalanceError::validation(
                "acid_strength",
                format!("{percent}% is not a usable acid strength"),
            ))
        }
    }

    pub fn percent(&self) -> f64 {
        self.0
    }

    fn volume_scale(&self) -> f64 {
        Self::STANDARD.0 / self.0
    }
}

impl Default for AcidStrength {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Chemical products the planner doses with.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Product {
    Stabilizer,
    SodiumBicarbonate,
    CalciumChloride,
    MuriaticAcid(AcidStrength),
    SodaAsh,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Stabilizer => f.write_str("stabilizer"),
            Product::SodiumBicarbonate => f.write_str("sodium bicarbonate"),
            Product::CalciumChloride => f.write_str("calcium chloride"),
            Product::MuriaticAcid(strength) => {
                write!(f, "muriatic acid ({}%)", strength.percent())
            }
            Product::SodaAsh => f.write_str("soda ash"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum DoseUnit {
    Ounces,
    Pounds,
    FluidOunces,
}

/// An amount of one product, with its operator-facing description.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Dose {
    pub product: Product,
    pub quantity: f64,
    pub unit: DoseUnit,
    pub description: String,
}

impl Dose {
    fn new(product: Product, quantity: f64, unit: DoseUnit) -> Self {
        let amount = match unit {
            DoseUnit::Ounces => format_dry_ounces(quantity),
            DoseUnit::Pounds => format_pounds(quantity),
            DoseUnit::FluidOunces => format_fluid_ounces(quantity),
        };
        Dose {
            product,
            quantity,
            unit,
            description: format!("{amount} {product}"),
        }
    }

    /// `None` unless `quantity` is a real, positive amount.
    fn positive(product: Product, quantity: f64, unit: DoseUnit) -> Option<Self> {
        if quantity > 0.0 && quantity.is_finite() {
            Some(Dose::new(product, quantity, unit))
        } else {
            None
        }
    }
}

impl fmt::Display for Dose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Stabilizer to raise cyanuric acid.
pub fn cya_raise_dose(current: f64, target: f64, gallons: f64) -> Option<Dose> {
    if target <= current {
        return None;
    }
    let ounces = (target - current) / 10.0 * STABILIZER_OZ_PER_10PPM * volume_factor(gallons);
    Dose::positive(Product::Stabilizer, ounces, DoseUnit::Ounces)
}

/// Sodium bicarbonate to raise total alkalinity.
pub fn alkalinity_raise_dose(current: f64, target: f64, gallons: f64) -> Option<Dose> {
    if target <= current {
        return None;
    }
    let pounds = (target - current) / 10.0 * BICARBONATE_LBS_PER_10PPM * volume_factor(gallons);
    Dose::positive(Product::SodiumBicarbonate, pounds, DoseUnit::Pounds)
}

/// Calcium chloride to raise calcium hardness.
pub fn calcium_raise_dose(current: f64, target: f64, gallons: f64) -> Option<Dose> {
    if target <= current {
        return None;
    }
    let pounds =
        (target - current) / 10.0 * CALCIUM_CHLORIDE_LBS_PER_10PPM * volume_factor(gallons);
    Dose::positive(Product::CalciumChloride, pounds, DoseUnit::Pounds)
}

/// Muriatic acid to lower total alkalinity.
pub fn alkalinity_lower_dose(
    current: f64,
    target: f64,
    gallons: f64,
    strength: AcidStrength,
) -> Option<Dose> {
    if current <= target {
        return None;
    }
    let fluid_ounces = (current - target) / 10.0
        * ACID_FLOZ_PER_10PPM_ALKALINITY
        * volume_factor(gallons)
        * strength.volume_scale();
    if fluid_ounces.is_nan() || fluid_ounces < MIN_ALKALINITY_ACID_FLOZ {
        return None;
    }
    Dose::positive(Product::MuriaticAcid(strength), fluid_ounces, DoseUnit::FluidOunces)
}

/// Muriatic acid to lower pH. Carbonate buffering makes the dose proportional
/// to total alkalinity.
pub fn ph_lower_dose(
    current: f64,
    target: f64,
    gallons: f64,
    alkalinity: f64,
    strength: AcidStrength,
) -> Option<Dose> {
    if current <= target {
        return None;
    }
    let fluid_ounces = (current - target)
        * ACID_FLOZ_PER_PH
        * volume_factor(gallons)
        * (alkalinity / 100.0)
        * strength.volume_scale();
    Dose::positive(Product::MuriaticAcid(strength), fluid_ounces, DoseUnit::FluidOunces)
}

/// Soda ash to raise pH.
pub fn ph_raise_dose(current: f64, target: f64, gallons: f64) -> Option<Dose> {
    if current >= target {
        return None;
    }
    let ounces = (target - current) / 0.2 * SODA_ASH_OZ_PER_0_2_PH * volume_factor(gallons);
    Dose::positive(Product::SodaAsh, ounces, DoseUnit::Ounces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cya_raise_dose() {
        let dose = cya_raise_dose(30.0, 40.0, 10_000.0).unwrap();
        assert_eq!(dose.description, "13.0 oz stabilizer");
        let dose = cya_raise_dose(10.0, 50.0, 10_000.0).unwrap();
        assert_eq!(dose.to_string(), "3.25 lbs (52.0 oz) stabilizer");
        assert_eq!(dose.unit, DoseUnit::Ounces);
        assert!(cya_raise_dose(50.0, 50.0, 10_000.0).is_none());
        assert!(cya_raise_dose(60.0, 50.0, 10_000.0).is_none());
    }

    #[test]
    fn test_alkalinity_raise_dose() {
        let dose = alkalinity_raise_dose(60.0, 100.0, 10_000.0).unwrap();
        assert_eq!(dose.description, "6.00 lbs sodium bicarbonate");
        assert!((dose.quantity - 6.0).abs() < 1e-9);
        let dose = alkalinity_raise_dose(80.0, 100.0, 20_000.0).unwrap();
        assert_eq!(dose.description, "6.00 lbs sodium bicarbonate");
        assert!(alkalinity_raise_dose(100.0, 100.0, 10_000.0).is_none());
    }

    #[test]
    fn test_calcium_raise_dose() {
        let dose = calcium_raise_dose(200.0, 300.0, 10_000.0).unwrap();
        assert_eq!(dose.description, "12.50 lbs calcium chloride");
        assert!(calcium_raise_dose(300.0, 300.0, 10_000.0).is_none());
        assert!(calcium_raise_dose(310.0, 300.0, 10_000.0).is_none());
    }

    #[test]
    fn test_alkalinity_lower_dose() {
        let dose = alkalinity_lower_dose(150.0, 100.0, 10_000.0, AcidStrength::STANDARD).unwrap();
        assert_eq!(dose.description, "2.00 gal (256.0 fl oz) muriatic acid (31.45%)");
        let dose = alkalinity_lower_dose(101.0, 100.0, 10_000.0, AcidStrength::STANDARD).unwrap();
        assert_eq!(dose.description, "5.1 fl oz muriatic acid (31.45%)");
        // under a fluid ounce is noise
        assert!(alkalinity_lower_dose(100.1, 100.0, 10_000.0, AcidStrength::STANDARD).is_none());
        assert!(alkalinity_lower_dose(90.0, 100.0, 10_000.0, AcidStrength::STANDARD).is_none());
    }

    #[test]
    fn test_ph_lower_dose() {
        let dose = ph_lower_dose(7.8, 7.5, 10_000.0, 100.0, AcidStrength::STANDARD).unwrap();
        assert_eq!(dose.description, "22.8 fl oz muriatic acid (31.45%)");
        // half the alkalinity, half the acid
        let dose = ph_lower_dose(7.8, 7.5, 10_000.0, 50.0, AcidStrength::STANDARD).unwrap();
        assert!((dose.quantity - 11.4).abs() < 1e-6);
        assert!(ph_lower_dose(7.5, 7.5, 10_000.0, 100.0, AcidStrength::STANDARD).is_none());
        assert!(ph_lower_dose(7.8, 7.5, 10_000.0, 0.0, AcidStrength::STANDARD).is_none());
    }

    #[test]
    fn test_ph_raise_dose() {
        let dose = ph_raise_dose(7.2, 7.5, 10_000.0).unwrap();
        assert_eq!(dose.description, "9.0 oz soda ash");
        let dose = ph_raise_dose(7.0, 7.6, 20_000.0).unwrap();
        assert_eq!(dose.description, "2.25 lbs (36.0 oz) soda ash");
        assert!(ph_raise_dose(7.5, 7.5, 10_000.0).is_none());
        assert!(ph_raise_dose(7.6, 7.5, 10_000.0).is_none());
    }

    #[test]
    fn test_weaker_acid_needs_more_volume() {
        let half = AcidStrength::new(15.725).unwrap();
        let dose = ph_lower_dose(7.8, 7.5, 10_000.0, 100.0, half).unwrap();
        assert!((dose.quantity - 45.6).abs() < 1e-6);
        assert_eq!(dose.description, "45.6 fl oz muriatic acid (15.725%)");
    }

    #[test]
    fn test_acid_strength_bounds() {
        assert!(AcidStrength::new(0.0).is_err());
        assert!(AcidStrength::new(120.0).is_err());
        assert!(AcidStrength::new(f64::NAN).is_err());
        assert_eq!(AcidStrength::default(), AcidStrength::STANDARD);
    }

    #[test]
    fn test_nan_volume_gives_no_dose() {
        assert!(calcium_raise_dose(200.0, 300.0, f64::NAN).is_none());
    }
}
