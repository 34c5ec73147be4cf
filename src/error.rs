use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unstable filter: prewarped cutoff {cutoff_hz:.2} Hz exceeds limit {limit_hz:.2} Hz")]
    UnstableFilter { cutoff_hz: f32, limit_hz: f32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, TrackingError>;
