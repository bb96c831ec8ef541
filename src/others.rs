use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// Write `data` to a timestamped CSV file named after `prefix`. Returns the
/// filename, or None when there was nothing to write.
pub fn create_csv_file<T: serde::Serialize>(data: &[T], prefix: &str) -> Result<Option<String>> {
    if data.is_empty() {
        return Ok(None);
    }
    let filename = format!("{}-{}.csv", prefix, new_york_time().format("%F-%H%M"));
    let mut writer =
        csv::Writer::from_path(&filename).with_context(|| format!("creating {filename}"))?;
    for line in data {
        writer
            .serialize(line)
            .with_context(|| format!("writing {filename}"))?;
    }
    writer.flush().with_context(|| format!("flushing {filename}"))?;
    Ok(Some(filename))
}

pub fn new_york_time() -> DateTime<Tz> {
    chrono::Utc::now().with_timezone(&chrono_tz::America::New_York)
}

/// The trading date expirations are quoted against.
pub fn new_york_date() -> NaiveDate {
    new_york_time().date_naive()
}

pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
