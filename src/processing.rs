use num_complex::Complex32;

use crate::config::{LockConfig, TrackingConfig};
use crate::error::Result;
use crate::signal_processing::{Cn0Estimator, LowPassFilter};

/// Per-epoch result of [`Cn0Monitor::process_epoch`]
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Cn0Sample {
    /// Epoch counter, starting at 0
    pub epoch: u64,
    /// Raw SNV estimate in dB-Hz
    pub raw_cn0: f32,
    /// Low-pass filtered estimate in dB-Hz
    pub smoothed_cn0: f32,
    /// Lock state after this epoch
    pub locked: bool,
}

/// C/N0 monitoring for one tracking channel
///
/// Feeds the raw SNV estimate through a low-pass filter every epoch and
/// derives a lock flag with hysteresis from the smoothed value. The filter
/// starts from the estimator's initial C/N0, so the bootstrap epoch does not
/// produce a transient.
#[derive(Debug, Clone)]
pub struct Cn0Monitor {
    estimator: Cn0Estimator,
    smoother: LowPassFilter,
    lock: LockConfig,
    locked: bool,
    epoch: u64,
}

impl Cn0Monitor {
    /// Create a monitor from a validated configuration
    ///
    /// # Errors
    /// Returns an error if the estimator or smoothing parameters are invalid.
    pub fn new(config: &TrackingConfig) -> Result<Self> {
        config.validate()?;

        let est = &config.estimator;
        let estimator = Cn0Estimator::try_new(
            est.bandwidth_hz,
            est.initial_cn0_dbhz,
            est.sampling_freq_hz,
            est.integration_freq_hz,
        )?;
        let smoother = config.smoothing.design().build(est.initial_cn0_dbhz)?;

        Ok(Self {
            estimator,
            smoother,
            lock: config.lock.clone(),
            locked: false,
            epoch: 0,
        })
    }

    /// Process one epoch of prompt correlator output
    pub fn process_epoch(&mut self, i: f32, q: f32) -> Cn0Sample {
        let raw_cn0 = self.estimator.update(i, q);
        let smoothed_cn0 = self.smoother.update(raw_cn0);
        self.update_lock(smoothed_cn0);

        let sample = Cn0Sample {
            epoch: self.epoch,
            raw_cn0,
            smoothed_cn0,
            locked: self.locked,
        };
        self.epoch += 1;
        sample
    }

    /// Process one epoch given the prompt as a complex value
    pub fn process_prompt(&mut self, prompt: Complex32) -> Cn0Sample {
        self.process_epoch(prompt.re, prompt.im)
    }

    /// Process a sequence of `(I, Q)` pairs
    pub fn process_buffer(&mut self, iq: &[(f32, f32)]) -> Vec<Cn0Sample> {
        iq.iter().map(|&(i, q)| self.process_epoch(i, q)).collect()
    }

    fn update_lock(&mut self, smoothed_cn0: f32) {
        if !self.locked && smoothed_cn0 >= self.lock.lock_threshold_dbhz {
            self.locked = true;
            log::info!(
                "Lock acquired at epoch {}: C/N0 {:.1} dB-Hz",
                self.epoch,
                smoothed_cn0
            );
        } else if self.locked && smoothed_cn0 < self.lock.unlock_threshold_dbhz {
            self.locked = false;
            log::warn!(
                "Lock lost at epoch {}: C/N0 {:.1} dB-Hz",
                self.epoch,
                smoothed_cn0
            );
        }
    }

    /// Latest unsmoothed estimate in dB-Hz
    pub fn raw_cn0(&self) -> f32 {
        self.estimator.cn0()
    }

    /// Latest smoothed estimate in dB-Hz
    pub fn smoothed_cn0(&self) -> f32 {
        self.smoother.value()
    }

    /// Current lock state
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of epochs processed since creation or reset
    pub fn epochs(&self) -> u64 {
        self.epoch
    }

    /// Restart the channel from `cn0`, dropping lock
    pub fn reset(&mut self, cn0: f32) {
        self.estimator.reset(cn0);
        self.smoother.reset(cn0);
        self.locked = false;
        self.epoch = 0;
    }
}
