//! Configuration for C/N0 tracking.
//!
//! Defaults describe a 1 ms coherent integration loop running at 1 kHz,
//! as used for GPS L1 C/A tracking. A configuration can also be loaded from
//! TOML; every section and field is optional:
//!
//! ```toml
//! [estimator]
//! bandwidth_hz = 1000.0
//! initial_cn0_dbhz = 25.0
//!
//! [smoothing]
//! cutoff_hz = 2.0
//!
//! [lock]
//! lock_threshold_dbhz = 29.5
//! unlock_threshold_dbhz = 28.5
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::constants::DEFAULT_PREWARP_MULTIPLIER;
use crate::error::{Result, TrackingError};
use crate::signal_processing::LowPassDesign;

/// Loop update rate specification
///
/// Can be specified as either a frequency in Hz or an integration period in
/// milliseconds. Tracking loops are usually described by their coherent
/// integration period rather than their rate.
///
/// # Parsing formats
/// - `1000` - frequency in Hz (no suffix)
/// - `1000hz` or `1000Hz` - frequency in Hz (explicit)
/// - `1ms` or `20ms` - integration period in milliseconds
///
/// # Example
/// ```
/// use cn0track::config::LoopRate;
///
/// let rate: LoopRate = "20ms".parse().unwrap();
/// assert!((rate.as_hz() - 50.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopRate(f32);

impl LoopRate {
    /// Create from frequency in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self(hz)
    }

    /// Create from integration period in milliseconds
    pub fn from_period_ms(ms: f32) -> Self {
        Self(1000.0 / ms)
    }

    /// Get frequency in Hz
    pub fn as_hz(&self) -> f32 {
        self.0
    }

    /// Get integration period in milliseconds
    pub fn as_period_ms(&self) -> f32 {
        1000.0 / self.0
    }
}

impl Default for LoopRate {
    fn default() -> Self {
        Self::from_period_ms(1.0)
    }
}

impl fmt::Display for LoopRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}hz", self.0)
    }
}

impl FromStr for LoopRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(num) = s.strip_suffix("ms") {
            let ms: f32 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid period: {}", s))?;
            if ms <= 0.0 {
                return Err("period must be positive".to_string());
            }
            return Ok(Self::from_period_ms(ms));
        }

        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        let hz: f32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid frequency: {}", s))?;
        if hz <= 0.0 {
            return Err("frequency must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Per-channel tracking configuration
///
/// # Example
/// ```
/// use cn0track::config::TrackingConfig;
///
/// let mut config = TrackingConfig::default();
/// config.smoothing.cutoff_hz = 1.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// C/N0 estimator parameters
    pub estimator: Cn0EstimatorConfig,
    /// Smoothing filter applied to the raw estimate
    pub smoothing: SmoothingConfig,
    /// Lock detection thresholds on the smoothed estimate
    pub lock: LockConfig,
}

/// C/N0 estimator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cn0EstimatorConfig {
    /// Loop noise bandwidth in Hz
    pub bandwidth_hz: f32,
    /// Estimate reported before the second epoch, in dB-Hz
    pub initial_cn0_dbhz: f32,
    /// Input sampling frequency in Hz
    pub sampling_freq_hz: f32,
    /// Loop integration frequency in Hz (1 / coherent integration period)
    pub integration_freq_hz: f32,
}

/// Low-pass smoothing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Target cutoff frequency in Hz
    pub cutoff_hz: f32,
    /// Rate at which the filter is updated, in Hz
    pub loop_freq_hz: f32,
    /// Cutoff scaling applied before prewarping
    pub prewarp_multiplier: f32,
}

/// Lock detector configuration
///
/// Thresholds apply to the smoothed estimate. The gap between them provides
/// hysteresis so that an estimate hovering at one threshold does not toggle
/// the lock state every epoch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Declare lock at or above this C/N0 in dB-Hz
    pub lock_threshold_dbhz: f32,
    /// Declare loss of lock below this C/N0 in dB-Hz
    pub unlock_threshold_dbhz: f32,
}

impl TrackingConfig {
    /// Parse a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| TrackingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackingError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Set the epoch rate for both the estimator and the smoothing filter
    pub fn set_loop_rate(&mut self, rate: LoopRate) {
        self.estimator.integration_freq_hz = rate.as_hz();
        self.smoothing.loop_freq_hz = rate.as_hz();
    }

    /// Check all parameters
    pub fn validate(&self) -> Result<()> {
        let est = &self.estimator;
        for (name, value) in [
            ("estimator.bandwidth_hz", est.bandwidth_hz),
            ("estimator.sampling_freq_hz", est.sampling_freq_hz),
            ("estimator.integration_freq_hz", est.integration_freq_hz),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TrackingError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        self.smoothing.design().validate()?;

        if self.lock.unlock_threshold_dbhz > self.lock.lock_threshold_dbhz {
            return Err(TrackingError::Config(format!(
                "unlock threshold {} dB-Hz is above lock threshold {} dB-Hz",
                self.lock.unlock_threshold_dbhz, self.lock.lock_threshold_dbhz
            )));
        }

        Ok(())
    }
}

impl SmoothingConfig {
    pub fn design(&self) -> LowPassDesign {
        LowPassDesign::new(self.cutoff_hz, self.loop_freq_hz)
            .with_prewarp_multiplier(self.prewarp_multiplier)
    }
}

impl Default for Cn0EstimatorConfig {
    fn default() -> Self {
        Self {
            bandwidth_hz: 1000.0,
            initial_cn0_dbhz: 25.0,
            sampling_freq_hz: 1000.0,
            integration_freq_hz: 1000.0,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 5.0,
            loop_freq_hz: 1000.0,
            prewarp_multiplier: DEFAULT_PREWARP_MULTIPLIER,
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            lock_threshold_dbhz: 29.0,
            unlock_threshold_dbhz: 28.0,
        }
    }
}
