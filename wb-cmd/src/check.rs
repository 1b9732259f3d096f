//! The `check` subcommand: compare readings to a caller-supplied standards table.

use crate::SampleArgs;
use anyhow::Context;
use clap::Args;
use log::{info, warn};
use wb_chem::{PoolType, Standards, WaterSample};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Standards CSV: jurisdiction,pool_type,parameter,min,max
    #[arg(short = 's', long)]
    pub standards: String,

    /// Jurisdiction to check against (case-insensitive)
    #[arg(short = 'j', long)]
    pub jurisdiction: String,

    /// Body of water: "pool" or "spa"
    #[arg(short = 'p', long)]
    pub pool_type: String,

    #[command(flatten)]
    pub sample: SampleArgs,

    /// Print violations as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_check(args: &CheckArgs) -> anyhow::Result<()> {
    let csv = std::fs::read_to_string(&args.standards)
        .with_context(|| format!("failed to read standards from {}", args.standards))?;
    let standards = Standards::from_csv(&csv)?;
    let pool_type = args.pool_type.parse::<PoolType>()?;
    let sample = WaterSample::from(&args.sample);
    sample.validate()?;

    let violations = standards.check(&args.jurisdiction, pool_type, &sample)?;
    if violations.is_empty() {
        info!("{} {} readings are within limits", args.jurisdiction, pool_type);
    } else {
        warn!(
            "{} reading(s) outside {} limits",
            violations.len(),
            args.jurisdiction
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&violations)?);
    } else if violations.is_empty() {
        println!("All readings are within {} {} limits.", args.jurisdiction, pool_type);
    } else {
        for violation in &violations {
            println!(" - {}", violation.message);
        }
    }
    Ok(())
}
