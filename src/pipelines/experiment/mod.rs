//! Parameter sweeps over the text generator.
//!
//! A [`Sweep`] declares which decoding parameters vary and over which
//! values; an [`ExperimentRunner`] applies every combination to a base set of
//! parameters and collects the outcomes into an [`ExperimentReport`].

pub mod assess;
pub mod presets;
pub mod report;
pub mod runner;
pub mod sweep;

pub use assess::{Assessment, Variation};
pub use report::{ExperimentRecord, ExperimentReport, ExperimentRun, RunOutcome};
pub use runner::ExperimentRunner;
pub use sweep::{Parameter, ParameterValue, Sweep, VariedParameter};
