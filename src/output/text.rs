use super::{Cn0Sample, Formatter};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, sample: &Cn0Sample) -> String {
        let lock = if sample.locked { "LOCK" } else { "----" };
        if self.verbose {
            format!(
                "Epoch {:>8}: C/N0 {:>5.1} dB-Hz (raw: {:.2}) {}",
                sample.epoch, sample.smoothed_cn0, sample.raw_cn0, lock
            )
        } else {
            format!(
                "Epoch {}: C/N0 {:.1} dB-Hz {}",
                sample.epoch, sample.smoothed_cn0, lock
            )
        }
    }
}
