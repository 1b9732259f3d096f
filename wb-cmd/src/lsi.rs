//! The `lsi` subcommand.

use crate::SampleArgs;
use clap::Args;
use log::info;
use serde::Serialize;
use std::fmt::{self, Write};
use wb_chem::{LsiFactors, LsiStatus, WaterSample};

#[derive(Args, Debug)]
pub struct LsiArgs {
    #[command(flatten)]
    pub sample: SampleArgs,

    /// Print the breakdown as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct LsiReport {
    #[serde(flatten)]
    factors: LsiFactors,
    status: LsiStatus,
}

pub fn run_lsi(args: &LsiArgs) -> anyhow::Result<()> {
    let sample = WaterSample::from(&args.sample);
    sample.validate()?;
    let factors = sample.lsi_factors();
    info!("LSI {:.2} ({})", factors.lsi, factors.status());

    if args.json {
        let report = LsiReport {
            factors,
            status: factors.status(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_lsi(&factors)?);
    }
    Ok(())
}

/// Component table with the index and its classification.
pub fn render_lsi(factors: &LsiFactors) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{:<24} {:>10} {:>8}", "Component", "Value", "Factor")?;
    writeln!(out, "{:<24} {:>10.2} {:>8}", "pH", factors.ph, "-")?;
    writeln!(
        out,
        "{:<24} {:>10.0} {:>8.2}  (corrected: {:.1})",
        "Alkalinity (ppm)",
        factors.alkalinity,
        factors.alkalinity_factor,
        factors.corrected_alkalinity
    )?;
    writeln!(
        out,
        "{:<24} {:>10.0} {:>8.2}",
        "Calcium Hardness (ppm)", factors.calcium, factors.calcium_factor
    )?;
    writeln!(
        out,
        "{:<24} {:>10.0} {:>8.2}",
        "Temperature (°F)", factors.temp_f, factors.temperature_factor
    )?;
    writeln!(
        out,
        "{:<24} {:>10.0} {:>8.2}",
        "TDS (ppm)", factors.tds, factors.tds_factor
    )?;
    writeln!(out, "{:<24} {:>10.0} {:>8}", "Cyanuric Acid (ppm)", factors.cya, "-")?;
    writeln!(out)?;
    writeln!(out, "LSI: {:+.2} ({})", factors.lsi, factors.status())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_chem::lsi_factors;

    #[test]
    fn test_render_lsi() {
        let factors = lsi_factors(7.5, 84.0, 300.0, 100.0, 30.0, 1000.0);
        let text = render_lsi(&factors).unwrap();
        assert!(text.contains("(corrected: 90.0)"));
        assert!(text.ends_with("LSI: +0.10 (balanced)\n"));
    }

    #[test]
    fn test_lsi_report_json() {
        let factors = lsi_factors(7.0, 60.0, 100.0, 60.0, 0.0, 1000.0);
        let report = LsiReport {
            factors,
            status: factors.status(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "Corrosive");
        assert_eq!(json["calcium_factor"], 1.6);
    }
}
