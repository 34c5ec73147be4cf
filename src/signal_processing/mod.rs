pub mod cn0_snv;
pub mod filter;
pub mod lowpass;

pub use cn0_snv::Cn0Estimator;
pub use filter::Filter;
pub use lowpass::{LowPassDesign, LowPassFilter};
