// SPDX-License-Identifier: GPL-3.0-only

//! Plain-text capture report
//!
//! The report is built from a session snapshot at export time. Location
//! values are written at full precision; the photo itself is never embedded.

use crate::constants::export::{FILE_EXTENSION, FILE_PREFIX, REPORT_HEADER};
use crate::session::Session;
use chrono::{DateTime, Local};
use std::fmt::{self, Write};
use tracing::warn;

/// Report rendering settings
#[derive(Debug, Clone)]
pub struct ReportOptions<'a> {
    pub map_base_url: &'a str,
    pub timestamp_format: &'a str,
}

/// Build the report text for `session` as of `generated_at`
pub fn build_report(
    session: &Session,
    generated_at: DateTime<Local>,
    options: &ReportOptions<'_>,
) -> String {
    let mut out = String::new();
    // Formatting into a String only fails if a Display impl does
    if let Err(e) = write_report(&mut out, session, generated_at, options) {
        warn!(error = %e, "Report formatting failed");
    }
    out
}

fn write_report(
    out: &mut impl Write,
    session: &Session,
    generated_at: DateTime<Local>,
    options: &ReportOptions<'_>,
) -> fmt::Result {
    writeln!(out, "{}", REPORT_HEADER)?;
    writeln!(out)?;
    writeln!(out, "Date: {}", generated_at.format(options.timestamp_format))?;
    writeln!(out)?;

    if let Some(fix) = session.location() {
        writeln!(out, "--- LOCATION DATA ---")?;
        writeln!(out, "Latitude: {}", fix.latitude)?;
        writeln!(out, "Longitude: {}", fix.longitude)?;
        writeln!(out, "Accuracy: {} meters", fix.accuracy_meters)?;
        writeln!(out, "Map Link: {}", fix.map_link(options.map_base_url))?;
        writeln!(out)?;
    }

    if session.photo().is_some() {
        writeln!(out, "--- PHOTO DATA ---")?;
        writeln!(
            out,
            "A photo was captured. The image data is held only in this session."
        )?;
        write!(
            out,
            "To keep the actual image, save it from the photo preview before closing."
        )?;
    }

    if !session.has_data() {
        write!(out, "No data has been captured yet.")?;
    }

    Ok(())
}

/// Report file name, disambiguated by the export time
pub fn report_file_name(generated_at: DateTime<Local>) -> String {
    format!(
        "{}{}.{}",
        FILE_PREFIX,
        generated_at.timestamp_millis(),
        FILE_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LocationFix, PhotoCapture};
    use chrono::TimeZone;

    fn options() -> ReportOptions<'static> {
        ReportOptions {
            map_base_url: "https://www.google.com/maps",
            timestamp_format: "%Y-%m-%d %H:%M:%S",
        }
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 17, 14, 3, 9).unwrap()
    }

    #[test]
    fn test_empty_report() {
        let report = build_report(&Session::new(), at(), &options());
        assert_eq!(
            report,
            "=== GPS & Camera Data Capture ===\n\nDate: 2024-05-17 14:03:09\n\nNo data has been captured yet."
        );
    }

    #[test]
    fn test_location_only_report_keeps_full_precision() {
        let mut session = Session::new();
        session.set_location(LocationFix::new(37.7749295, -122.4194155, 8.0));
        let report = build_report(&session, at(), &options());

        assert!(report.contains("Latitude: 37.7749295\n"));
        assert!(report.contains("Longitude: -122.4194155\n"));
        assert!(report.contains("Accuracy: 8 meters\n"));
        assert!(report.contains("Map Link: https://www.google.com/maps?q=37.7749295,-122.4194155\n"));
        assert!(!report.contains("PHOTO DATA"));
        assert!(!report.contains("No data has been captured"));
    }

    #[test]
    fn test_photo_section_does_not_embed_image() {
        let mut session = Session::new();
        session.set_photo(PhotoCapture::from_png(b"png-bytes", 1, 1, at()));
        let report = build_report(&session, at(), &options());

        assert!(report.contains("--- PHOTO DATA ---"));
        assert!(!report.contains("base64"));
        assert!(!report.contains("LOCATION DATA"));
    }

    struct RejectingWriter;

    impl Write for RejectingWriter {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_write_report_stops_at_first_error() {
        let result = write_report(&mut RejectingWriter, &Session::new(), at(), &options());
        assert_eq!(result, Err(fmt::Error));
    }

    #[test]
    fn test_file_name_uses_millis() {
        let name = report_file_name(at());
        assert!(name.starts_with("captured_data_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name, format!("captured_data_{}.txt", at().timestamp_millis()));
    }
}
