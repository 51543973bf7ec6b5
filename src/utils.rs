//! Utility functions for the league service

use chrono::{DateTime, Local, NaiveDate, Utc};
use uuid::Uuid;

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Today's date in the server's local timezone; game dates carry no zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Unique suffix for scratch files written before an atomic rename
pub fn scratch_suffix() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Round to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
