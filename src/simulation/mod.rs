mod correlator;
mod measure;

pub use correlator::{CorrelatorConfig, CorrelatorSimulator};
pub use measure::{Cn0Measurement, measure_cn0, sweep_cn0};
