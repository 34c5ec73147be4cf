use num_complex::Complex32;
use std::f32::consts::PI;

use crate::constants::{
    BUTTERWORTH_EDGE_ATTENUATION_DB, DEFAULT_PREWARP_MULTIPLIER, NYQUIST_SAFETY_FACTOR,
};
use crate::error::{Result, TrackingError};
use crate::signal_processing::Filter;

/// Design parameters for [`LowPassFilter`]
///
/// The target cutoff is scaled by `prewarp_multiplier` and prewarped with
/// the bilinear frequency mapping before the Butterworth corner is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassDesign {
    /// Target cutoff frequency in Hz
    pub cutoff_hz: f32,
    /// Loop (sample) frequency in Hz
    pub loop_hz: f32,
    /// Cutoff scaling applied before prewarping
    pub prewarp_multiplier: f32,
}

impl LowPassDesign {
    pub fn new(cutoff_hz: f32, loop_hz: f32) -> Self {
        Self {
            cutoff_hz,
            loop_hz,
            prewarp_multiplier: DEFAULT_PREWARP_MULTIPLIER,
        }
    }

    pub fn with_prewarp_multiplier(mut self, multiplier: f32) -> Self {
        self.prewarp_multiplier = multiplier;
        self
    }

    /// Largest cutoff frequency that keeps the filter clear of the Nyquist limit
    pub fn max_cutoff_hz(&self) -> f32 {
        NYQUIST_SAFETY_FACTOR * 0.5 * self.loop_hz / self.prewarp_multiplier
    }

    /// Check the stability precondition
    ///
    /// # Errors
    /// Returns `TrackingError::InvalidParameter` for non-positive or
    /// non-finite frequencies, and `TrackingError::UnstableFilter` when the
    /// prewarped cutoff is not safely below the loop Nyquist frequency.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cutoff frequency", self.cutoff_hz),
            ("loop frequency", self.loop_hz),
            ("prewarp multiplier", self.prewarp_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TrackingError::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.cutoff_hz >= self.max_cutoff_hz() {
            return Err(TrackingError::UnstableFilter {
                cutoff_hz: self.cutoff_hz * self.prewarp_multiplier,
                limit_hz: NYQUIST_SAFETY_FACTOR * 0.5 * self.loop_hz,
            });
        }

        Ok(())
    }

    /// Compute the IIR coefficients `(a, b)`
    ///
    /// Transfer function `F(z) = b(1 + z^-1) / (1 + a z^-1)`, the bilinear
    /// transform of `w0 / (s + w0)` with the corner placed by the Butterworth
    /// magnitude law at the prewarped cutoff.
    pub fn coefficients(&self) -> (f32, f32) {
        let ts = 1.0 / self.loop_hz;
        let wp = self.prewarp_multiplier * self.cutoff_hz * 2.0 * PI * ts;
        let op = 1.0 / (PI * ts) * (wp / 2.0).tan();
        let ap = 10.0_f32.powf(BUTTERWORTH_EDGE_ATTENUATION_DB / 20.0);
        let oc = op / (1.0 / (ap * ap) - 1.0).sqrt();
        let k = oc * ts;

        let b = k / (2.0 + k);
        let a = (k - 2.0) / (k + 2.0);
        (a, b)
    }

    /// Validate the design and build a filter starting at `initial`
    pub fn build(&self, initial: f32) -> Result<LowPassFilter> {
        self.validate()?;
        let filter = LowPassFilter::from_design(self, initial);
        log::debug!(
            "Low-pass filter: cutoff={} Hz, loop={} Hz, a={:.6}, b={:.6}, corner={:.3} Hz",
            self.cutoff_hz,
            self.loop_hz,
            filter.a,
            filter.b,
            filter.corner_frequency()
        );
        Ok(filter)
    }
}

/// First-order Butterworth low-pass IIR filter (bilinear transform)
///
/// Used to smooth per-epoch estimates such as the raw C/N0 before they are
/// handed to loop-bandwidth control or lock detection. Realizes
///
/// ```text
/// y[n] = b*x[n] + b*x[n-1] - a*y[n-1]
/// ```
///
/// The delay line is seeded from the initial value so that a constant input
/// equal to it passes through without a start-up transient.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    a: f32,
    b: f32,
    xn: f32,
    yn: f32,
    loop_hz: f32,
}

impl LowPassFilter {
    /// Create a new filter with the default prewarp multiplier
    ///
    /// # Arguments
    /// * `initial` - Value the filter output starts from
    /// * `cutoff_hz` - Cutoff frequency in Hz
    /// * `loop_hz` - Loop (update) frequency in Hz
    ///
    /// The stability precondition is only asserted in debug builds; use
    /// [`LowPassFilter::try_new`] for untrusted parameters.
    pub fn new(initial: f32, cutoff_hz: f32, loop_hz: f32) -> Self {
        Self::from_design(&LowPassDesign::new(cutoff_hz, loop_hz), initial)
    }

    /// Create a new filter, validating the stability precondition
    ///
    /// # Errors
    /// See [`LowPassDesign::validate`].
    pub fn try_new(initial: f32, cutoff_hz: f32, loop_hz: f32) -> Result<Self> {
        LowPassDesign::new(cutoff_hz, loop_hz).build(initial)
    }

    fn from_design(design: &LowPassDesign, initial: f32) -> Self {
        debug_assert!(
            design.validate().is_ok(),
            "unstable low-pass design: {design:?}"
        );

        let (a, b) = design.coefficients();
        Self {
            a,
            b,
            xn: initial * b,
            yn: initial,
            loop_hz: design.loop_hz,
        }
    }

    /// Feed a new value and return the filtered output
    pub fn update(&mut self, value: f32) -> f32 {
        let tmp = self.b * value;
        self.yn = tmp + self.xn - self.a * self.yn;
        self.xn = tmp;
        self.yn
    }

    /// Last filter output
    pub fn value(&self) -> f32 {
        self.yn
    }

    /// Feedback and feedforward coefficients `(a, b)`
    pub fn coefficients(&self) -> (f32, f32) {
        (self.a, self.b)
    }

    /// Re-seed the delay line so the output continues from `value`
    pub fn reset(&mut self, value: f32) {
        self.yn = value;
        self.xn = value * self.b;
    }

    /// Magnitude response at `freq_hz`
    pub fn magnitude_at(&self, freq_hz: f32) -> f32 {
        let omega = 2.0 * PI * freq_hz / self.loop_hz;
        let z_inv = Complex32::from_polar(1.0, -omega);
        let one = Complex32::new(1.0, 0.0);
        let h = (one + z_inv) * self.b / (one + z_inv * self.a);
        h.norm()
    }

    /// Frequency in Hz at which the response is 3 dB down
    pub fn corner_frequency(&self) -> f32 {
        // Bilinear image of the analog corner: tan(w/2) = k/2, k = 2b/(1-b)
        let k = 2.0 * self.b / (1.0 - self.b);
        self.loop_hz / PI * (k / 2.0).atan()
    }
}

impl Filter for LowPassFilter {
    fn process(&mut self, sample: f32) -> f32 {
        self.update(sample)
    }
}
