use rolling_stats::Stats;

use crate::config::Cn0EstimatorConfig;
use crate::error::Result;
use crate::signal_processing::Cn0Estimator;

use super::{CorrelatorConfig, CorrelatorSimulator};

/// Statistics of the raw SNV estimate over a simulated run
#[derive(Debug, Clone, serde::Serialize)]
pub struct Cn0Measurement {
    pub true_cn0_dbhz: f32,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

/// Run the estimator over `epochs` simulated epochs
///
/// The bootstrap epoch is excluded from the statistics.
pub fn measure_cn0(
    correlator: &CorrelatorConfig,
    estimator: &Cn0EstimatorConfig,
    epochs: usize,
) -> Result<Cn0Measurement> {
    let mut sim = CorrelatorSimulator::new(correlator)?;
    let mut est = Cn0Estimator::try_new(
        estimator.bandwidth_hz,
        estimator.initial_cn0_dbhz,
        estimator.sampling_freq_hz,
        estimator.integration_freq_hz,
    )?;

    let mut stats: Stats<f32> = Stats::new();
    for n in 0..epochs {
        let (i, q) = sim.next_epoch();
        let cn0 = est.update(i, q);
        if n > 0 {
            stats.update(cn0);
        }
    }

    Ok(Cn0Measurement {
        true_cn0_dbhz: correlator.cn0_dbhz,
        mean: stats.mean,
        std_dev: stats.std_dev,
        min: stats.min,
        max: stats.max,
    })
}

/// Measure the estimate for each C/N0 in `cn0_values`
pub fn sweep_cn0(
    cn0_values: &[f32],
    base: &CorrelatorConfig,
    estimator: &Cn0EstimatorConfig,
    epochs: usize,
) -> Result<Vec<Cn0Measurement>> {
    cn0_values
        .iter()
        .map(|&cn0| {
            let correlator = CorrelatorConfig {
                cn0_dbhz: cn0,
                ..base.clone()
            };
            measure_cn0(&correlator, estimator, epochs)
        })
        .collect()
}
