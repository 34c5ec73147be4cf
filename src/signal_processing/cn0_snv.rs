use num_complex::Complex32;

use crate::constants::{NSR_MAX, NSR_MIN_MULTIPLIER};
use crate::error::{Result, TrackingError};

/// C/N0 estimator using the Signal-to-Noise Variance (SNV) method
///
/// Estimates carrier-to-noise density ratio from two consecutive prompt
/// correlator outputs:
///
/// ```text
/// P_s   = (0.5 * (|I(n)| + |I(n-1)|))^2
/// P_tot = 0.5 * (I(n)^2 + I(n-1)^2 + Q(n)^2 + Q(n-1)^2)
/// C/N0  = log_bw - 10 * log10(P_tot / P_s)
/// ```
///
/// The first update only records the correlator magnitudes; the estimate
/// changes from the second update onwards. The noise-to-signal ratio is
/// clamped to [`NSR_MAX`], so the estimate never drops below `log_bw - 60`.
#[derive(Debug, Clone)]
pub struct Cn0Estimator {
    log_bw: f32,
    prev_abs: Option<(f32, f32)>,
    cn0: f32,
}

impl Cn0Estimator {
    /// Create a new estimator
    ///
    /// # Arguments
    /// * `bandwidth_hz` - Loop noise bandwidth in Hz
    /// * `initial_cn0` - Initial C/N0 in dB-Hz, reported until the second update
    /// * `sampling_freq_hz` - Input sampling frequency in Hz
    /// * `integration_freq_hz` - Loop integration frequency in Hz
    ///
    /// Frequencies and bandwidth must be positive. This is only checked in
    /// debug builds; use [`Cn0Estimator::try_new`] for untrusted parameters.
    pub fn new(
        bandwidth_hz: f32,
        initial_cn0: f32,
        sampling_freq_hz: f32,
        integration_freq_hz: f32,
    ) -> Self {
        debug_assert!(bandwidth_hz > 0.0, "bandwidth must be positive");
        debug_assert!(sampling_freq_hz > 0.0, "sampling frequency must be positive");
        debug_assert!(
            integration_freq_hz > 0.0,
            "integration frequency must be positive"
        );

        // Normalize by sampling frequency and integration period
        let log_bw = 10.0 * (bandwidth_hz * integration_freq_hz / sampling_freq_hz).log10();

        Self {
            log_bw,
            prev_abs: None,
            cn0: initial_cn0,
        }
    }

    /// Create a new estimator, validating the parameters
    ///
    /// # Errors
    /// Returns `TrackingError::InvalidParameter` if the bandwidth or either
    /// frequency is not a positive finite number, or the initial C/N0 is not
    /// finite.
    pub fn try_new(
        bandwidth_hz: f32,
        initial_cn0: f32,
        sampling_freq_hz: f32,
        integration_freq_hz: f32,
    ) -> Result<Self> {
        for (name, value) in [
            ("bandwidth", bandwidth_hz),
            ("sampling frequency", sampling_freq_hz),
            ("integration frequency", integration_freq_hz),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TrackingError::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !initial_cn0.is_finite() {
            return Err(TrackingError::InvalidParameter(format!(
                "initial C/N0 must be finite, got {initial_cn0}"
            )));
        }

        let estimator = Self::new(
            bandwidth_hz,
            initial_cn0,
            sampling_freq_hz,
            integration_freq_hz,
        );
        log::debug!(
            "C/N0 estimator: bw={bandwidth_hz} Hz, f_s={sampling_freq_hz} Hz, f_i={integration_freq_hz} Hz, log_bw={:.2} dB",
            estimator.log_bw
        );
        Ok(estimator)
    }

    /// Feed one epoch of prompt correlator output
    ///
    /// # Arguments
    /// * `i` - In-phase component
    /// * `q` - Quadrature component
    ///
    /// # Returns
    /// Current C/N0 estimate in dB-Hz
    pub fn update(&mut self, i: f32, q: f32) -> f32 {
        let i_abs = i.abs();
        let q_abs = q.abs();

        if let Some((i_prev_abs, q_prev_abs)) = self.prev_abs.replace((i_abs, q_abs)) {
            // Powers are squared, so normalize to keep large inputs finite.
            // The ratio P_tot / P_s does not depend on scale.
            let scale = i_abs.max(q_abs).max(i_prev_abs).max(q_prev_abs);

            let nsr = if scale > 0.0 {
                let (i_abs, q_abs) = (i_abs / scale, q_abs / scale);
                let (i_prev_abs, q_prev_abs) = (i_prev_abs / scale, q_prev_abs / scale);

                let p_s = {
                    let mean = 0.5 * (i_abs + i_prev_abs);
                    mean * mean
                };
                let p_tot = 0.5
                    * (q_prev_abs * q_prev_abs
                        + i_prev_abs * i_prev_abs
                        + q_abs * q_abs
                        + i_abs * i_abs);
                let p_n = p_tot - p_s;

                if p_s <= p_n * NSR_MIN_MULTIPLIER {
                    NSR_MAX
                } else {
                    p_tot / p_s
                }
            } else {
                // All-zero input: P_s = P_n = 0 sits on the clamp boundary
                NSR_MAX
            };

            self.cn0 = self.log_bw - 10.0 * nsr.log10();
        }

        self.cn0
    }

    /// Feed one epoch of prompt correlator output given as a complex value
    pub fn update_prompt(&mut self, prompt: Complex32) -> f32 {
        self.update(prompt.re, prompt.im)
    }

    /// Current C/N0 estimate in dB-Hz
    pub fn cn0(&self) -> f32 {
        self.cn0
    }

    /// Normalized loop bandwidth `10*log10(bw * f_i / f_s)` in dB
    ///
    /// Upper bound of the estimate: the reported C/N0 never exceeds this.
    pub fn log_bw(&self) -> f32 {
        self.log_bw
    }

    /// Whether a previous correlator sample has been recorded
    pub fn is_bootstrapped(&self) -> bool {
        self.prev_abs.is_some()
    }

    /// Forget the previous sample and restart from `cn0`
    pub fn reset(&mut self, cn0: f32) {
        self.prev_abs = None;
        self.cn0 = cn0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_update_returns_initial_cn0() {
        for (i, q) in [(0.0, 0.0), (1.0, -1.0), (-250.0, 3.5), (1e6, 1e-6)] {
            let mut est = Cn0Estimator::new(2.0, 42.5, 1000.0, 1000.0);
            assert_eq!(est.update(i, q), 42.5);
            assert_eq!(est.cn0(), 42.5);
        }
    }

    #[test]
    fn test_log_bw() {
        let est = Cn0Estimator::new(1.0, 0.0, 1000.0, 1.0);
        assert_relative_eq!(est.log_bw(), -30.0, epsilon = 1e-5);

        let est = Cn0Estimator::new(10.0, 0.0, 1.0, 1000.0);
        assert_relative_eq!(est.log_bw(), 40.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pure_signal_reports_log_bw() {
        let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);

        assert_eq!(est.update(1.0, 0.0), 35.0);
        let cn0 = est.update(1.0, 0.0);
        assert_relative_eq!(cn0, -30.0, epsilon = 1e-5);

        for _ in 0..10 {
            assert_relative_eq!(est.update(1.0, 0.0), -30.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_data_bit_sign_is_ignored() {
        let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);
        est.update(2.0, 0.0);
        let cn0 = est.update(-2.0, 0.0);
        assert_relative_eq!(cn0, est.log_bw(), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_input_clamps_nsr() {
        let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);
        assert_eq!(est.update(0.0, 0.0), 35.0);

        for _ in 0..5 {
            let cn0 = est.update(0.0, 0.0);
            assert!(cn0.is_finite());
            assert_relative_eq!(cn0, est.log_bw() - 60.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_quadrature_only_clamps_nsr() {
        let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);
        est.update(0.0, 1.0);
        let cn0 = est.update(0.0, 1.0);
        assert_relative_eq!(cn0, est.log_bw() - 60.0, epsilon = 1e-4);
    }

    #[test]
    fn test_large_inputs_stay_finite() {
        let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);
        est.update(3e19, 0.0);
        let cn0 = est.update(3e19, 0.0);
        assert!(cn0.is_finite());
        assert_relative_eq!(cn0, est.log_bw(), epsilon = 1e-5);

        let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);
        est.update(1e19, 1e19);
        let cn0 = est.update(1e19, 1e19);
        let expected = est.log_bw() - 10.0 * 2.0_f32.log10();
        assert_relative_eq!(cn0, expected, epsilon = 1e-4);

        let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);
        est.update(f32::MAX, -f32::MAX);
        let cn0 = est.update(-f32::MAX, f32::MAX);
        assert_relative_eq!(cn0, expected, epsilon = 1e-4);
    }

    #[test]
    fn test_clamp_threshold() {
        // Q carries unit noise, I = s on both epochs: P_s = s^2, P_n = 0.5
        let cn0_for = |s: f32| {
            let mut est = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0);
            est.update(s, 1.0);
            est.update(s, 0.0)
        };
        let floor = Cn0Estimator::new(1.0, 35.0, 1000.0, 1.0).log_bw() - 60.0;

        // Below the 1e-6 ratio the NSR is clamped
        assert_relative_eq!(cn0_for(0.4e-6_f32.sqrt()), floor, epsilon = 1e-4);

        // Just above it the ratio is used and sits slightly above the floor
        let above = cn0_for(0.6e-6_f32.sqrt());
        assert!(above > floor && above < floor + 1.0, "{above} vs floor {floor}");
    }

    #[test]
    fn test_known_power_split() {
        // P_s = 1, P_tot = 0.5 * (1 + 1 + 1 + 1) = 2, NSR = 2
        let mut est = Cn0Estimator::new(1.0, 0.0, 1000.0, 1.0);
        est.update(1.0, 1.0);
        let cn0 = est.update(1.0, 1.0);
        let expected = est.log_bw() - 10.0 * 2.0_f32.log10();
        assert_relative_eq!(cn0, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_update_prompt_matches_update() {
        let mut a = Cn0Estimator::new(1.0, 40.0, 1000.0, 1.0);
        let mut b = a.clone();
        for (i, q) in [(0.9, 0.1), (-1.1, 0.2), (1.0, -0.05)] {
            assert_eq!(a.update(i, q), b.update_prompt(Complex32::new(i, q)));
        }
    }

    #[test]
    fn test_reset_restarts_bootstrap() {
        let mut est = Cn0Estimator::new(1.0, 40.0, 1000.0, 1.0);
        est.update(1.0, 0.0);
        est.update(1.0, 0.0);
        assert!(est.is_bootstrapped());

        est.reset(45.0);
        assert!(!est.is_bootstrapped());
        assert_eq!(est.update(0.0, 1.0), 45.0);
    }

    #[test]
    fn test_try_new_rejects_invalid_parameters() {
        assert!(Cn0Estimator::try_new(0.0, 40.0, 1000.0, 1000.0).is_err());
        assert!(Cn0Estimator::try_new(1.0, 40.0, -1.0, 1000.0).is_err());
        assert!(Cn0Estimator::try_new(1.0, 40.0, 1000.0, 0.0).is_err());
        assert!(Cn0Estimator::try_new(1.0, f32::NAN, 1000.0, 1000.0).is_err());
        assert!(Cn0Estimator::try_new(1.0, 40.0, f32::INFINITY, 1000.0).is_err());
        assert!(Cn0Estimator::try_new(1.0, 40.0, 1000.0, 1000.0).is_ok());
    }
}
