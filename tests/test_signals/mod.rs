//! Deterministic correlator patterns for estimator and filter tests.

#![allow(dead_code)]

use cn0track::simulation::{CorrelatorConfig, CorrelatorSimulator};

/// Constant prompt output
pub fn constant_iq(i: f32, q: f32, epochs: usize) -> Vec<(f32, f32)> {
    vec![(i, q); epochs]
}

/// Prompt output with a data bit flip every `bit_epochs` epochs
pub fn data_modulated_iq(amplitude: f32, bit_epochs: usize, epochs: usize) -> Vec<(f32, f32)> {
    (0..epochs)
        .map(|n| {
            let sign = if (n / bit_epochs) % 2 == 0 { 1.0 } else { -1.0 };
            (sign * amplitude, 0.0)
        })
        .collect()
}

/// Seeded noisy prompt output at the given C/N0 with 1 ms integration
pub fn noisy_iq(cn0_dbhz: f32, seed: u64, epochs: usize) -> Vec<(f32, f32)> {
    let config = CorrelatorConfig::new(cn0_dbhz, 0.001)
        .with_seed(seed)
        .with_data_bits(20);
    CorrelatorSimulator::new(&config)
        .expect("valid correlator config")
        .generate(epochs)
}

pub fn std_dev(values: &[f32]) -> f32 {
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32).sqrt()
}
