//! Display strings shared by the table view and the PDF report.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// Text shown for fields the catalog left empty.
pub const PLACEHOLDER: &str = "N/A";

/// Formats a price with a dollar prefix, keeping the record's own precision.
pub fn format_price(price: f64) -> String {
    format!("${}", price)
}

/// Formats a rating on the five point scale.
pub fn format_rating(rating: f64) -> String {
    format!("{}/5", rating)
}

/// Returns `value` or [`PLACEHOLDER`] when it is missing or blank.
pub fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => PLACEHOLDER,
    }
}

/// Formats the "Page i of N" label.
pub fn page_label(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

/// The two timestamp lines printed in the report metadata block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportTimestamps {
    pub created_on: String,
    pub scanned_on: String,
}

impl ReportTimestamps {
    /// Formats both lines from the export instant.
    pub fn at<Tz>(instant: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            created_on: format!(
                "Report created on: {}",
                instant.format("%A, %B %-d, %Y")
            ),
            scanned_on: format!("Scanned on: {}", instant.format("%-I:%M:%S %p")),
        }
    }

    /// Returns both lines in print order.
    pub fn lines(&self) -> [&str; 2] {
        [&self.created_on, &self.scanned_on]
    }
}
