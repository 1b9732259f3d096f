//! Command implementations for the water balance CLI.
//!
//! Provides subcommands for planning chemical doses, breaking down the
//! saturation index, and checking readings against regulatory limits.

use clap::{Args, Subcommand};
use wb_chem::sample::{PoolType, WaterSample, DEFAULT_TDS, DEFAULT_TEMPERATURE_F};

pub mod check;
pub mod lsi;
pub mod plan;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan the chemical doses that bring the water to its target chemistry
    Plan(plan::PlanArgs),

    /// Break down the Langelier Saturation Index for a sample
    Lsi(lsi::LsiArgs),

    /// Check a sample against a jurisdiction's regulatory limits
    Check(check::CheckArgs),
}

/// Test-kit readings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Measured pH
    #[arg(long)]
    pub ph: f64,

    /// Total alkalinity (ppm)
    #[arg(long)]
    pub alkalinity: f64,

    /// Calcium hardness (ppm)
    #[arg(long)]
    pub calcium: f64,

    /// Cyanuric acid (ppm)
    #[arg(long)]
    pub cya: f64,

    /// Water temperature (°F)
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE_F)]
    pub temperature: f64,

    /// Total dissolved solids (ppm)
    #[arg(long, default_value_t = DEFAULT_TDS)]
    pub tds: f64,

    /// Free chlorine (ppm)
    #[arg(long)]
    pub free_chlorine: Option<f64>,

    /// Total chlorine (ppm)
    #[arg(long)]
    pub total_chlorine: Option<f64>,
}

impl From<&SampleArgs> for WaterSample {
    fn from(args: &SampleArgs) -> Self {
        WaterSample {
            ph: args.ph,
            alkalinity: args.alkalinity,
            calcium: args.calcium,
            cya: args.cya,
            temperature_f: args.temperature,
            tds: args.tds,
            free_chlorine: args.free_chlorine,
            total_chlorine: args.total_chlorine,
        }
    }
}

/// Parse an optional `--pool-type`; absence is left for the planner to reject.
pub(crate) fn parse_pool_type(pool_type: Option<&str>) -> anyhow::Result<Option<PoolType>> {
    Ok(pool_type.map(str::parse::<PoolType>).transpose()?)
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Plan(args) => plan::run_plan(&args),
        Command::Lsi(args) => lsi::run_lsi(&args),
        Command::Check(args) => check::run_check(&args),
    }
}
