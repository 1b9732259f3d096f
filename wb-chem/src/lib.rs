//! Water chemistry balancing for pools and spas.
//!
//! Given a set of test-kit readings this crate computes the Langelier
//! Saturation Index, resolves the target ("golden number") chemistry for the
//! pool type, and plans the chemical doses that move the water there.
//!
//! # Usage
//!
//! ```rust
//! use wb_chem::{plan, PoolType, TargetOverrides, WaterSample};
//!
//! let sample = WaterSample {
//!     ph: 7.2,
//!     alkalinity: 60.0,
//!     calcium: 200.0,
//!     cya: 10.0,
//!     ..Default::default()
//! };
//! let balance =
//!     plan(Some(PoolType::Pool), 10_000.0, &sample, &TargetOverrides::default()).unwrap();
//! let first = balance.steps[0].dose.as_ref().unwrap();
//! assert_eq!(first.to_string(), "6.00 lbs sodium bicarbonate");
//! ```
//!
//! # Modules
//!
//! - [`lsi`] - saturation index and its factor breakdown
//! - [`dose`] - one formula per chemical action
//! - [`targets`] - golden numbers, overrides and the target resolver
//! - [`planner`] - sequencing with knock-on pH effects
//! - [`standards`] - caller-supplied regulatory limits

pub mod dose;
pub mod error;
pub mod lsi;
pub mod planner;
pub mod sample;
pub mod standards;
pub mod targets;

pub use dose::{AcidStrength, Dose};
pub use error::{BalanceError, Result};
pub use lsi::{compute_lsi, lsi_factors, LsiFactors, LsiStatus};
pub use planner::{plan, DoseStep, Parameter, Plan, Planner, SecondaryEffect};
pub use sample::{PoolType, WaterSample};
pub use standards::{Standards, Violation};
pub use targets::{resolve_targets, GoldenNumbers, TargetOverrides, TargetSet};
