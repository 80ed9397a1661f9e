//! Parameter tuning for the crossover signal generator.
//!
//! A [`ParamGrid`] expands into every combination of candidate values.
//! Each combination is backtested over the full history or scored
//! fold-by-fold with [`WalkForward`], and the [`Tuner`] aggregates one
//! [`TuningRow`] per combination.

mod grid;
mod sweep;
mod walk_forward;

pub use grid::{apply_params, ParamGrid, ParamSet, TUNABLE_PARAMS};
pub use sweep::{aggregate, export_csv, Tuner, TuningRow};
pub use walk_forward::{Fold, WalkForward};
