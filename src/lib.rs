pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod processing;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::TrackingConfig;
pub use error::{Result, TrackingError};
pub use processing::{Cn0Monitor, Cn0Sample};
pub use signal_processing::{Cn0Estimator, LowPassFilter};
pub use wav::{load_iq_wav, save_iq_wav};
