use super::{Cn0Sample, Formatter, iso8601_timestamp};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, sample: &Cn0Sample) -> String {
        format!(
            "{},{},{:.2},{:.2},{}",
            iso8601_timestamp(),
            sample.epoch,
            sample.raw_cn0,
            sample.smoothed_cn0,
            u8::from(sample.locked)
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,epoch,raw_cn0,smoothed_cn0,locked")
    }
}
