//! Numeric constants for the tracking-loop estimators
//!
//! These constants bound the C/N0 estimator output and define the design
//! margins of the smoothing filter.

/// Multiplier for detecting an out-of-range noise-to-signal ratio.
/// Signal power at or below `noise_power * NSR_MIN_MULTIPLIER` is clamped.
pub const NSR_MIN_MULTIPLIER: f32 = 1e-6;

/// Largest reported noise-to-signal ratio (1 / `NSR_MIN_MULTIPLIER`).
/// Bounds the estimate at `log_bw - 60` dB-Hz.
pub const NSR_MAX: f32 = 1e6;

/// Cutoff scaling applied before the Butterworth prewarp.
pub const DEFAULT_PREWARP_MULTIPLIER: f32 = 10.0;

/// Passband edge attenuation used for the Butterworth corner, in dB.
pub const BUTTERWORTH_EDGE_ATTENUATION_DB: f32 = -3.0;

/// Fraction of the loop Nyquist frequency the prewarped cutoff must stay below.
/// At the Nyquist frequency itself the filter pole reaches the unit circle.
pub const NYQUIST_SAFETY_FACTOR: f32 = 0.9;
