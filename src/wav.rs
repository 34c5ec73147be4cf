//! I/Q epoch recordings as stereo WAV files.
//!
//! Left channel carries I, right channel carries Q, one frame per epoch.
//! The WAV sample rate is the epoch (loop) rate.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Result, TrackingError};

pub fn save_iq_wav<P: AsRef<Path>>(path: P, iq: &[(f32, f32)], epoch_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: epoch_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for &(i, q) in iq {
        writer.write_sample(i)?;
        writer.write_sample(q)?;
    }

    writer.finalize()?;
    Ok(())
}

/// Load an I/Q recording, returning the epochs and the epoch rate in Hz
///
/// Integer WAV files are scaled to [-1, 1).
pub fn load_iq_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<(f32, f32)>, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 2 {
        return Err(TrackingError::InvalidInput(format!(
            "expected stereo I/Q WAV file, got {} channels",
            spec.channels
        )));
    }

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = 2f32.powi(i32::from(spec.bits_per_sample) - 1);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let iq = samples.chunks_exact(2).map(|c| (c[0], c[1])).collect();
    Ok((iq, spec.sample_rate))
}
