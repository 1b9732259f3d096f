//! The `plan` subcommand: dosing steps in order, followed by advisory notes.

use crate::{parse_pool_type, SampleArgs};
use anyhow::Context;
use clap::Args;
use log::info;
use std::fmt::{self, Write};
use wb_chem::{
    dose::AcidStrength,
    planner::{Parameter, Plan, Planner},
    targets::{GoldenNumbers, TargetOverrides},
    WaterSample,
};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Body of water: "pool" or "spa"
    #[arg(short = 'p', long)]
    pub pool_type: Option<String>,

    /// Water volume in gallons
    #[arg(short = 'g', long)]
    pub volume: f64,

    #[command(flatten)]
    pub sample: SampleArgs,

    /// Override the pH target
    #[arg(long)]
    pub target_ph: Option<f64>,

    /// Override the total alkalinity target (ppm)
    #[arg(long)]
    pub target_alkalinity: Option<f64>,

    /// Override the calcium hardness target (ppm)
    #[arg(long)]
    pub target_calcium: Option<f64>,

    /// Override the cyanuric acid target (ppm)
    #[arg(long)]
    pub target_cya: Option<f64>,

    /// Golden numbers CSV to use instead of the built-in table
    #[arg(long)]
    pub golden: Option<String>,

    /// Muriatic acid strength (% HCl)
    #[arg(long, default_value_t = 31.45)]
    pub acid_strength: f64,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    fn overrides(&self) -> TargetOverrides {
        TargetOverrides {
            ph: self.target_ph,
            alkalinity: self.target_alkalinity,
            calcium: self.target_calcium,
            cya: self.target_cya,
        }
    }
}

pub fn run_plan(args: &PlanArgs) -> anyhow::Result<()> {
    let golden = match &args.golden {
        Some(path) => {
            let csv = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read golden numbers from {path}"))?;
            info!("Using golden numbers from {}", path);
            GoldenNumbers::from_csv(&csv)?
        }
        None => GoldenNumbers::embedded()?,
    };
    let planner = Planner::new(golden, AcidStrength::new(args.acid_strength)?);
    let pool_type = parse_pool_type(args.pool_type.as_deref())?;
    let sample = WaterSample::from(&args.sample);

    let plan = planner.plan(pool_type, args.volume, &sample, &args.overrides())?;
    info!(
        "Planned {} of {} steps with a dose",
        plan.steps.iter().filter(|s| s.dose.is_some()).count(),
        plan.steps.len()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", render_plan(&plan, args.volume)?);
    }
    Ok(())
}

fn format_value(parameter: Parameter, value: f64) -> String {
    match parameter {
        Parameter::Ph => format!("{:.2}", value),
        _ => format!("{:.0}", value),
    }
}

/// Plain-text table of the plan followed by its notes.
pub fn render_plan(plan: &Plan, volume_gallons: f64) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Water balance plan for {:.0} gallons", volume_gallons)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<3} {:<18} {:>8} {:>8}  Dose",
        "#", "Parameter", "Current", "Target"
    )?;
    for (idx, step) in plan.steps.iter().enumerate() {
        let dose = step
            .dose
            .as_ref()
            .map_or_else(|| "None needed".to_string(), |d| d.to_string());
        writeln!(
            out,
            "{:<3} {:<18} {:>8} {:>8}  {}",
            idx + 1,
            step.parameter.label(),
            format_value(step.parameter, step.current),
            format_value(step.parameter, step.target),
            dose
        )?;
        if let Some(effect) = &step.effect {
            write!(
                out,
                "    pH {:+.2} -> ~{:.2}",
                effect.ph_shift, effect.anticipated_ph
            )?;
            match &effect.compensation {
                Some(compensation) => writeln!(out, ", then {}", compensation)?,
                None => writeln!(out)?,
            }
        }
    }
    if !plan.notes.is_empty() {
        writeln!(out)?;
        writeln!(out, "Notes:")?;
        for note in &plan.notes {
            writeln!(out, " - {}", note)?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Adjust chemicals in the order shown above for best results.")?;
    Ok(out)
}
