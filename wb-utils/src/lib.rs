//! Shared utility functions for water balance crates.

/// US customary dosing units
pub mod units {
    /// Dry ounces in a pound.
    pub const OUNCES_PER_POUND: f64 = 16.0;

    /// Fluid ounces in a US gallon.
    pub const FLUID_OUNCES_PER_GALLON: f64 = 128.0;

    /// Dosing rates are quoted per 10,000 gallons of water.
    pub const REFERENCE_GALLONS: f64 = 10_000.0;

    /// Scale factor from a per-10,000-gallon rate to `gallons` of water.
    pub fn volume_factor(gallons: f64) -> f64 {
        gallons / REFERENCE_GALLONS
    }

    /// Format a dry weight given in ounces.
    /// Switches to pounds (keeping the ounce figure) above one pound,
    /// e.g. 12.0 -> "12.0 oz", 26.0 -> "1.63 lbs (26.0 oz)"
    pub fn format_dry_ounces(ounces: f64) -> String {
        if ounces > OUNCES_PER_POUND {
            format!("{:.2} lbs ({:.1} oz)", ounces / OUNCES_PER_POUND, ounces)
        } else {
            format!("{:.1} oz", ounces)
        }
    }

    /// Format a dry weight given in pounds, e.g. 6.0 -> "6.00 lbs"
    pub fn format_pounds(pounds: f64) -> String {
        format!("{:.2} lbs", pounds)
    }

    /// Format a liquid volume given in fluid ounces.
    /// One gallon and above is shown in gallons with the fluid ounce figure kept.
    pub fn format_fluid_ounces(fluid_ounces: f64) -> String {
        if fluid_ounces < FLUID_OUNCES_PER_GALLON {
            format!("{:.1} fl oz", fluid_ounces)
        } else {
            format!(
                "{:.2} gal ({:.1} fl oz)",
                fluid_ounces / FLUID_OUNCES_PER_GALLON,
                fluid_ounces
            )
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_volume_factor() {
            assert!((volume_factor(10_000.0) - 1.0).abs() < f64::EPSILON);
            assert!((volume_factor(25_000.0) - 2.5).abs() < f64::EPSILON);
        }

        #[test]
        fn test_format_dry_ounces() {
            assert_eq!(format_dry_ounces(12.0), "12.0 oz");
            assert_eq!(format_dry_ounces(16.0), "16.0 oz");
            assert_eq!(format_dry_ounces(52.0), "3.25 lbs (52.0 oz)");
        }

        #[test]
        fn test_format_pounds() {
            assert_eq!(format_pounds(6.0), "6.00 lbs");
            assert_eq!(format_pounds(1.3333), "1.33 lbs");
        }

        #[test]
        fn test_format_fluid_ounces() {
            assert_eq!(format_fluid_ounces(45.6), "45.6 fl oz");
            // exactly one gallon switches units
            assert_eq!(format_fluid_ounces(128.0), "1.00 gal (128.0 fl oz)");
            assert_eq!(format_fluid_ounces(204.8), "1.60 gal (204.8 fl oz)");
        }
    }
}
