mod test_signals;

use approx::assert_relative_eq;
use cn0track::config::Cn0EstimatorConfig;
use cn0track::signal_processing::Cn0Estimator;
use cn0track::simulation::{CorrelatorConfig, measure_cn0, sweep_cn0};

fn run(est: &mut Cn0Estimator, iq: &[(f32, f32)]) -> Vec<f32> {
    iq.iter().map(|&(i, q)| est.update(i, q)).collect()
}

#[test]
fn test_bootstrap_returns_initial_value() {
    for initial in [-10.0, 0.0, 35.0, 52.25] {
        let mut est = Cn0Estimator::new(1.0, initial, 1000.0, 1.0);
        assert_eq!(est.update(123.0, -456.0), initial);
    }
}

#[test]
fn test_reference_log_bw_and_clean_signal() {
    let mut est = Cn0Estimator::new(1.0, 40.0, 1000.0, 1.0);
    let out = run(&mut est, &test_signals::constant_iq(1.0, 0.0, 10));

    assert_eq!(out[0], 40.0);
    for cn0 in &out[1..] {
        assert_relative_eq!(*cn0, -30.0, epsilon = 1e-5);
    }
}

#[test]
fn test_data_bit_flips_do_not_affect_clean_estimate() {
    let mut est = Cn0Estimator::new(1000.0, 40.0, 1000.0, 1000.0);
    let out = run(&mut est, &test_signals::data_modulated_iq(0.7, 20, 200));
    for cn0 in &out[1..] {
        assert_relative_eq!(*cn0, est.log_bw(), epsilon = 1e-4);
    }
}

#[test]
fn test_degenerate_zero_signal_is_finite() {
    let mut est = Cn0Estimator::new(1.0, 40.0, 1000.0, 1.0);
    let out = run(&mut est, &test_signals::constant_iq(0.0, 0.0, 10));
    for cn0 in &out[1..] {
        assert!(cn0.is_finite());
        assert_relative_eq!(*cn0, -90.0, epsilon = 1e-3);
    }
}

#[test]
fn test_estimate_stays_within_clamp_bounds() {
    let mut est = Cn0Estimator::new(1000.0, 20.0, 1000.0, 1000.0);
    let upper = est.log_bw();
    let lower = upper - 60.0;

    for cn0_dbhz in [10.0, 25.0, 40.0, 60.0] {
        for cn0 in run(&mut est, &test_signals::noisy_iq(cn0_dbhz, 11, 2000)) {
            assert!(cn0 <= upper + 1e-4, "{cn0} above log_bw {upper}");
            assert!(cn0 >= lower - 1e-3, "{cn0} below clamp floor {lower}");
        }
    }

    // Large magnitudes, zeros and inputs on either side of the 1e-6 clamp ratio
    let edge_cases: [(f32, f32); 10] = [
        (3e19, 0.0),
        (3e19, 0.0),
        (1e19, -1e19),
        (-1e19, 1e19),
        (0.0, 0.0),
        (0.0, 0.0),
        (f32::MAX, 0.0),
        (0.0, f32::MIN_POSITIVE),
        (0.4e-6_f32.sqrt(), 1.0),
        (0.6e-6_f32.sqrt(), 0.0),
    ];
    let mut est = Cn0Estimator::new(1000.0, 20.0, 1000.0, 1000.0);
    for cn0 in run(&mut est, &edge_cases) {
        assert!(cn0.is_finite());
        assert!(cn0 <= upper + 1e-4, "{cn0} above log_bw {upper}");
        assert!(cn0 >= lower - 1e-3, "{cn0} below clamp floor {lower}");
    }
}

#[test]
fn test_strong_signal_after_noise_is_not_poisoned() {
    let mut est = Cn0Estimator::new(1000.0, 20.0, 1000.0, 1000.0);
    run(&mut est, &test_signals::noisy_iq(30.0, 5, 100));

    let strong = test_signals::constant_iq(3e19, 0.0, 10);
    let last = *run(&mut est, &strong).last().unwrap();
    assert_relative_eq!(last, est.log_bw(), epsilon = 1e-4);
}

#[test]
fn test_stronger_signal_reports_higher_cn0() {
    let estimator = Cn0EstimatorConfig::default();
    let base = CorrelatorConfig::new(0.0, 0.001)
        .with_seed(2024)
        .with_data_bits(20);

    let results = sweep_cn0(&[25.0, 35.0, 45.0], &base, &estimator, 5000).unwrap();

    for pair in results.windows(2) {
        assert!(
            pair[1].mean > pair[0].mean + 0.3,
            "mean estimate at {} dB-Hz ({:.2}) should exceed {} dB-Hz ({:.2})",
            pair[1].true_cn0_dbhz,
            pair[1].mean,
            pair[0].true_cn0_dbhz,
            pair[0].mean
        );
    }
}

#[test]
fn test_phase_error_lowers_estimate() {
    let estimator = Cn0EstimatorConfig::default();
    let aligned = CorrelatorConfig::new(45.0, 0.001).with_seed(5);
    let rotated = aligned
        .clone()
        .with_phase_error(std::f32::consts::PI / 3.0);

    let aligned = measure_cn0(&aligned, &estimator, 3000).unwrap();
    let rotated = measure_cn0(&rotated, &estimator, 3000).unwrap();

    assert!(
        rotated.mean < aligned.mean - 3.0,
        "phase error should move power into Q: aligned {:.2}, rotated {:.2}",
        aligned.mean,
        rotated.mean
    );
}

#[test]
fn test_replay_is_deterministic() {
    let iq = test_signals::noisy_iq(38.0, 99, 1000);

    let mut first = Cn0Estimator::new(1000.0, 30.0, 1000.0, 1000.0);
    let mut second = Cn0Estimator::new(1000.0, 30.0, 1000.0, 1000.0);

    assert_eq!(run(&mut first, &iq), run(&mut second, &iq));
}
