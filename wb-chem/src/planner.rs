//! Water balance planner.
//!
//! Doses are sequenced Alkalinity -> Calcium -> CYA -> pH. Sodium bicarbonate
//! pushes pH up and stabilizer pulls it down, so the planner carries a running
//! anticipated pH from one step to the next and attaches a compensating dose
//! whenever that estimate crosses the pH target.

use crate::{
    dose::{
        alkalinity_lower_dose, alkalinity_raise_dose, calcium_raise_dose, cya_raise_dose,
        ph_lower_dose, ph_raise_dose, AcidStrength, Dose,
    },
    error::{BalanceError, Result},
    sample::{ensure_non_negative, PoolType, WaterSample},
    targets::{
        resolve_targets, AlkalinityAction, GoldenNumbers, Resolution, TargetOverrides, TargetSet,
    },
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// pH rise per 10 ppm of alkalinity added as sodium bicarbonate.
pub const PH_RISE_PER_10PPM_ALKALINITY: f64 = 0.03;

/// pH drop per 10 ppm of cyanuric acid added as stabilizer.
pub const PH_DROP_PER_10PPM_CYA: f64 = 0.07;

/// The four balanced parameters, in plan order.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Alkalinity,
    Calcium,
    Cya,
    Ph,
}

impl Parameter {
    pub const PLAN_ORDER: [Parameter; 4] = [
        Parameter::Alkalinity,
        Parameter::Calcium,
        Parameter::Cya,
        Parameter::Ph,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Alkalinity => "Total Alkalinity",
            Parameter::Calcium => "Calcium Hardness",
            Parameter::Cya => "Cyanuric Acid",
            Parameter::Ph => "pH",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Knock-on pH change of a dose and what it takes to undo it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SecondaryEffect {
    /// Signed: positive raises pH.
    pub ph_shift: f64,
    pub anticipated_ph: f64,
    pub compensation: Option<Dose>,
}

/// One row of a plan. `dose` is `None` when nothing needs adding.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DoseStep {
    pub parameter: Parameter,
    pub current: f64,
    pub target: f64,
    pub dose: Option<Dose>,
    pub effect: Option<SecondaryEffect>,
}

impl DoseStep {
    fn new(parameter: Parameter, current: f64, target: f64, dose: Option<Dose>) -> Self {
        DoseStep {
            parameter,
            current,
            target,
            dose,
            effect: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<DoseStep>,
    pub notes: Vec<String>,
}

impl Plan {
    pub fn step(&self, parameter: Parameter) -> Option<&DoseStep> {
        self.steps.iter().find(|step| step.parameter == parameter)
    }

    /// True if any step carries a dose.
    pub fn needs_action(&self) -> bool {
        self.steps.iter().any(|step| step.dose.is_some())
    }
}

/// Plans against a golden numbers table with a given acid product.
#[derive(Debug, Clone)]
pub struct Planner {
    golden: GoldenNumbers,
    acid_strength: AcidStrength,
}

impl Planner {
    pub fn new(golden: GoldenNumbers, acid_strength: AcidStrength) -> Self {
        Planner {
            golden,
            acid_strength,
        }
    }

    /// Embedded golden numbers and 31.45% muriatic acid.
    pub fn standard() -> Result<Self> {
        Ok(Planner::new(GoldenNumbers::embedded()?, AcidStrength::STANDARD))
    }

    pub fn plan(
        &self,
        pool_type: Option<PoolType>,
        volume_gallons: f64,
        measured: &WaterSample,
        overrides: &TargetOverrides,
    ) -> Result<Plan> {
        let pool_type = pool_type.ok_or_else(|| {
            BalanceError::Configuration("a pool type ('pool' or 'spa') is required".to_string())
        })?;
        measured.validate()?;
        overrides.validate()?;
        ensure_non_negative("volume_gallons", volume_gallons)?;
        if volume_gallons == 0.0 {
            return Err(BalanceError::Validation {
                field: "volume_gallons",
                reason: "volume must be greater than zero".to_string(),
            });
        }

        let standard = self.golden.for_pool_type(pool_type)?;
        let resolve_from = self.acid_reachable(volume_gallons, measured, &standard, overrides);
        let Resolution {
            targets,
            mut notes,
            alkalinity_action,
        } = resolve_targets(&standard, &resolve_from, overrides);
        debug!("Planning {} gal {} toward {:?}", volume_gallons, pool_type, targets);

        let mut running_ph = measured.ph;
        let steps = vec![
            self.alkalinity_step(
                volume_gallons,
                measured,
                &targets,
                alkalinity_action,
                &mut running_ph,
                &mut notes,
            ),
            DoseStep::new(
                Parameter::Calcium,
                measured.calcium,
                targets.calcium,
                calcium_raise_dose(measured.calcium, targets.calcium, volume_gallons),
            ),
            self.cya_step(volume_gallons, measured, &targets, &mut running_ph, &mut notes),
            self.ph_step(volume_gallons, measured, &targets),
        ];

        Ok(Plan { steps, notes })
    }

    /// Alkalinity only a sliver above target would need less acid than can be
    /// measured out, so it is resolved as if already at target. That keeps
    /// the acid note and pH re-targeting out of a plan with no acid dose.
    fn acid_reachable(
        &self,
        volume_gallons: f64,
        measured: &WaterSample,
        standard: &TargetSet,
        overrides: &TargetOverrides,
    ) -> WaterSample {
        let target = overrides.apply(*standard).alkalinity;
        let below_dosing_floor = measured.alkalinity > target
            && alkalinity_lower_dose(
                measured.alkalinity,
                target,
                volume_gallons,
                self.acid_strength,
            )
            .is_none();
        if below_dosing_floor {
            debug!(
                "Alkalinity {} ppm is above target {} ppm but below the acid dosing floor",
                measured.alkalinity, target
            );
            WaterSample {
                alkalinity: target,
                ..measured.clone()
            }
        } else {
            measured.clone()
        }
    }

    fn alkalinity_step(
        &self,
        volume_gallons: f64,
        measured: &WaterSample,
        targets: &TargetSet,
        action: AlkalinityAction,
        running_ph: &mut f64,
        notes: &mut Vec<String>,
    ) -> DoseStep {
        let (current, target) = (measured.alkalinity, targets.alkalinity);
        if action == AlkalinityAction::Lower {
            let dose = alkalinity_lower_dose(current, target, volume_gallons, self.acid_strength);
            return DoseStep::new(Parameter::Alkalinity, current, target, dose);
        }

        let mut step = DoseStep::new(
            Parameter::Alkalinity,
            current,
            target,
            alkalinity_raise_dose(current, target, volume_gallons),
        );
        if step.dose.is_none() {
            return step;
        }

        let increase = target - current;
        let rise = increase / 10.0 * PH_RISE_PER_10PPM_ALKALINITY;
        let anticipated = *running_ph + rise;
        *running_ph = anticipated;
        debug!("Bicarbonate: pH +{:.3} -> {:.3}", rise, anticipated);
        notes.push(format!(
            "Raising alkalinity by {:.0} ppm with sodium bicarbonate will also raise pH by about \
             {:.2} (to ~{:.2}).",
            increase, rise, anticipated
        ));

        let compensation = if anticipated > targets.ph {
            ph_lower_dose(anticipated, targets.ph, volume_gallons, target, self.acid_strength)
        } else {
            None
        };
        if let Some(acid) = &compensation {
            notes.push(format!(
                "Once the sodium bicarbonate has fully dispersed, wait about 30 minutes, retest \
                 pH, then add {} to bring pH back to {:.2}.",
                acid, targets.ph
            ));
        }
        step.effect = Some(SecondaryEffect {
            ph_shift: rise,
            anticipated_ph: anticipated,
            compensation,
        });
        step
    }

    fn cya_step(
        &self,
        volume_gallons: f64,
        measured: &WaterSample,
        targets: &TargetSet,
        running_ph: &mut f64,
        notes: &mut Vec<String>,
    ) -> DoseStep {
        let (current, target) = (measured.cya, targets.cya);
        let mut step = DoseStep::new(
            Parameter::Cya,
            current,
            target,
            cya_raise_dose(current, target, volume_gallons),
        );
        if step.dose.is_none() {
            return step;
        }

        let increase = target - current;
        let drop = increase / 10.0 * PH_DROP_PER_10PPM_CYA;
        let anticipated = *running_ph - drop;
        *running_ph = anticipated;
        debug!("Stabilizer: pH -{:.3} -> {:.3}", drop, anticipated);

        let compensation = if anticipated < targets.ph {
            ph_raise_dose(anticipated, targets.ph, volume_gallons)
        } else {
            None
        };
        match &compensation {
            Some(soda_ash) => notes.push(format!(
                "Adding {:.0} ppm of stabilizer will lower pH by about {:.2} (to ~{:.2}). Once \
                 the stabilizer has fully dissolved (allow 2-3 days with the pump running), \
                 retest pH, then add {} to bring pH back to {:.2}.",
                increase, drop, anticipated, soda_ash, targets.ph
            )),
            None => notes.push(format!(
                "Adding {:.0} ppm of stabilizer will lower pH by about {:.2} (to ~{:.2}), which \
                 stays at or above the {:.2} target.",
                increase, drop, anticipated, targets.ph
            )),
        }
        step.effect = Some(SecondaryEffect {
            ph_shift: -drop,
            anticipated_ph: anticipated,
            compensation,
        });
        step
    }

    fn ph_step(
        &self,
        volume_gallons: f64,
        measured: &WaterSample,
        targets: &TargetSet,
    ) -> DoseStep {
        let (current, target) = (measured.ph, targets.ph);
        let dose = if current > target {
            ph_lower_dose(
                current,
                target,
                volume_gallons,
                measured.alkalinity,
                self.acid_strength,
            )
        } else {
            ph_raise_dose(current, target, volume_gallons)
        };
        DoseStep::new(Parameter::Ph, current, target, dose)
    }
}

/// Plan with the embedded golden numbers and standard-strength acid.
pub fn plan(
    pool_type: Option<PoolType>,
    volume_gallons: f64,
    measured: &WaterSample,
    overrides: &TargetOverrides,
) -> Result<Plan> {
    Planner::standard()?.plan(pool_type, volume_gallons, measured, overrides)
}
