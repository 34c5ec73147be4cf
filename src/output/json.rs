use super::{Cn0Sample, Formatter, iso8601_timestamp};

pub struct JsonFormatter;

/// JSON has no NaN or infinity literal
fn json_number(value: f32) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "null".to_string()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, sample: &Cn0Sample) -> String {
        format!(
            r#"{{"ts":"{}","epoch":{},"raw_cn0":{},"smoothed_cn0":{},"locked":{}}}"#,
            iso8601_timestamp(),
            sample.epoch,
            json_number(sample.raw_cn0),
            json_number(sample.smoothed_cn0),
            sample.locked
        )
    }
}
