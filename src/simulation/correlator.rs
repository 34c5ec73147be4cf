use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{Result, TrackingError};

/// Synthetic prompt correlator configuration
///
/// The prompt output is `A * d * (cos(phi), sin(phi)) + n` with complex
/// white noise `n`. The per-component noise variance is chosen so that the
/// coherent SNR `A^2 / (2 sigma^2)` equals `C/N0 * T`.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct CorrelatorConfig {
    /// Carrier-to-noise density ratio in dB-Hz
    pub cn0_dbhz: f32,
    /// Coherent integration time in seconds
    pub integration_time_s: f32,
    /// Signal amplitude at the prompt correlator
    pub amplitude: f32,
    /// Residual carrier phase error in radians
    pub phase_error_rad: f32,
    /// Navigation data bit length in epochs (20 for GPS L1 C/A at 1 ms)
    pub data_bit_epochs: Option<usize>,
    pub seed: Option<u64>,
}

impl CorrelatorConfig {
    pub fn new(cn0_dbhz: f32, integration_time_s: f32) -> Self {
        Self {
            cn0_dbhz,
            integration_time_s,
            amplitude: 1.0,
            phase_error_rad: 0.0,
            data_bit_epochs: None,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_data_bits(mut self, epochs_per_bit: usize) -> Self {
        self.data_bit_epochs = Some(epochs_per_bit);
        self
    }

    pub fn with_phase_error(mut self, phase_error_rad: f32) -> Self {
        self.phase_error_rad = phase_error_rad;
        self
    }

    /// Per-component noise standard deviation
    pub fn noise_std(&self) -> f32 {
        let snr = 10.0_f32.powf(self.cn0_dbhz / 10.0) * self.integration_time_s;
        (self.amplitude * self.amplitude / (2.0 * snr)).sqrt()
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Generates one prompt I/Q pair per epoch
pub struct CorrelatorSimulator {
    rng: ChaCha8Rng,
    noise: Normal<f64>,
    amplitude: f32,
    phase_error_rad: f32,
    data_bit_epochs: Option<usize>,
    data_bit: f32,
    epoch: usize,
}

impl CorrelatorSimulator {
    pub fn new(config: &CorrelatorConfig) -> Result<Self> {
        if !(config.integration_time_s > 0.0) {
            return Err(TrackingError::InvalidParameter(format!(
                "integration time must be positive, got {}",
                config.integration_time_s
            )));
        }
        if config.data_bit_epochs == Some(0) {
            return Err(TrackingError::InvalidParameter(
                "data bit length must be at least one epoch".to_string(),
            ));
        }

        let noise = Normal::new(0.0, config.noise_std() as f64)
            .map_err(|e| TrackingError::InvalidParameter(format!("noise: {e}")))?;

        Ok(Self {
            rng: create_rng(config.seed),
            noise,
            amplitude: config.amplitude,
            phase_error_rad: config.phase_error_rad,
            data_bit_epochs: config.data_bit_epochs,
            data_bit: 1.0,
            epoch: 0,
        })
    }

    pub fn next_epoch(&mut self) -> (f32, f32) {
        if let Some(bit_len) = self.data_bit_epochs
            && self.epoch % bit_len == 0
        {
            self.data_bit = if self.rng.random::<bool>() { 1.0 } else { -1.0 };
        }
        self.epoch += 1;

        let signal = self.amplitude * self.data_bit;
        let i = signal * self.phase_error_rad.cos() + self.noise.sample(&mut self.rng) as f32;
        let q = signal * self.phase_error_rad.sin() + self.noise.sample(&mut self.rng) as f32;
        (i, q)
    }

    pub fn generate(&mut self, epochs: usize) -> Vec<(f32, f32)> {
        (0..epochs).map(|_| self.next_epoch()).collect()
    }
}
