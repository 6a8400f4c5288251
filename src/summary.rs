// SPDX-License-Identifier: GPL-3.0-only

//! Summary block shown after every capture
//!
//! [`Summary::of`] is a pure function of the session; [`refresh`] renders it
//! and unlocks the export action once anything has been captured.

use crate::constants::location::DISPLAY_DECIMALS;
use crate::presenter::{Action, ActionState, Presenter};
use crate::session::{LocationFix, PhotoCapture, Session};

/// Displayed state of the photo section
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoSummary {
    NotYet,
    Captured { width: u32, height: u32 },
}

/// Displayed state of the location section
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSummary {
    NotYet,
    Captured {
        latitude: String,
        longitude: String,
        accuracy_meters: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub photo: PhotoSummary,
    pub location: LocationSummary,
}

impl Summary {
    pub fn of(session: &Session) -> Self {
        Self {
            photo: session
                .photo()
                .map(PhotoSummary::from)
                .unwrap_or(PhotoSummary::NotYet),
            location: session
                .location()
                .map(LocationSummary::from)
                .unwrap_or(LocationSummary::NotYet),
        }
    }

    pub fn photo_captured(&self) -> bool {
        matches!(self.photo, PhotoSummary::Captured { .. })
    }

    pub fn location_captured(&self) -> bool {
        matches!(self.location, LocationSummary::Captured { .. })
    }

    /// Whether the export action should be offered
    pub fn has_data(&self) -> bool {
        self.photo_captured() || self.location_captured()
    }

    /// Text lines of the summary block, photo section first
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);

        match &self.photo {
            PhotoSummary::NotYet => lines.push("Photo Captured: Not yet".to_string()),
            PhotoSummary::Captured { .. } => lines.push("Photo Captured: Yes".to_string()),
        }

        match &self.location {
            LocationSummary::NotYet => lines.push("Location Captured: Not yet".to_string()),
            LocationSummary::Captured {
                latitude,
                longitude,
                accuracy_meters,
            } => {
                lines.push("Location Captured: Yes".to_string());
                lines.push(format!("Coordinates: {}, {}", latitude, longitude));
                lines.push(format!("Accuracy: Within {} meters", accuracy_meters));
            }
        }

        lines
    }
}

impl From<&PhotoCapture> for PhotoSummary {
    fn from(photo: &PhotoCapture) -> Self {
        PhotoSummary::Captured {
            width: photo.width,
            height: photo.height,
        }
    }
}

impl From<&LocationFix> for LocationSummary {
    fn from(fix: &LocationFix) -> Self {
        LocationSummary::Captured {
            latitude: display_coordinate(fix.latitude),
            longitude: display_coordinate(fix.longitude),
            accuracy_meters: fix.accuracy_meters,
        }
    }
}

/// Render the summary and reveal the export action when there is data
///
/// Export is never hidden again: entities cannot be removed from a session.
pub fn refresh(session: &Session, presenter: &mut dyn Presenter) {
    let summary = Summary::of(session);
    presenter.render(&summary);
    if summary.has_data() {
        presenter.set_action(Action::DownloadReport, ActionState::Available);
        if summary.photo_captured() {
            presenter.set_action(Action::SavePhoto, ActionState::Available);
        }
    }
}

/// Coordinate as shown on screen (6 decimal places)
pub fn display_coordinate(value: f64) -> String {
    round_decimal(value, DISPLAY_DECIMALS)
}

/// Round to `decimals` places, half away from zero, on the shortest decimal
/// representation of `value` rather than its binary expansion
///
/// `37.7749295` is stored as `37.77492949999...` in binary; rounding the
/// decimal form gives `37.774930`, which is what a reader of the raw value
/// expects.
pub fn round_decimal(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    let frac: Vec<u8> = frac_part.bytes().map(|b| b - b'0').collect();

    for i in 0..decimals {
        digits.push(frac.get(i).copied().unwrap_or(0));
    }

    if frac.get(decimals).is_some_and(|&d| d >= 5) {
        let mut idx = digits.len();
        loop {
            if idx == 0 {
                digits.insert(0, 1);
                break;
            }
            idx -= 1;
            if digits[idx] == 9 {
                digits[idx] = 0;
            } else {
                digits[idx] += 1;
                break;
            }
        }
    }

    let split = digits.len() - decimals;
    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 && digits.iter().any(|&d| d != 0) {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| char::from(b'0' + d)));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|d| char::from(b'0' + d)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_decimal_half_away_from_zero() {
        assert_eq!(round_decimal(37.7749295, 6), "37.774930");
        assert_eq!(round_decimal(-122.4194155, 6), "-122.419416");
        assert_eq!(round_decimal(1.5, 0), "2");
        assert_eq!(round_decimal(-2.5, 0), "-3");
    }

    #[test]
    fn test_round_decimal_pads_and_carries() {
        assert_eq!(round_decimal(12.0, 6), "12.000000");
        assert_eq!(round_decimal(0.1, 3), "0.100");
        assert_eq!(round_decimal(9.9999996, 6), "10.000000");
        assert_eq!(round_decimal(-0.0000001, 6), "0.000000");
    }

    #[test]
    fn test_round_decimal_non_finite() {
        assert_eq!(round_decimal(f64::NAN, 6), "NaN");
        assert_eq!(round_decimal(f64::INFINITY, 6), "inf");
    }

    #[test]
    fn test_empty_session_summary() {
        let summary = Summary::of(&Session::new());
        assert!(!summary.has_data());
        assert_eq!(
            summary.lines(),
            vec!["Photo Captured: Not yet", "Location Captured: Not yet"]
        );
    }

    #[test]
    fn test_location_summary_lines() {
        let mut session = Session::new();
        session.set_location(LocationFix::new(37.7749295, -122.4194155, 14.6));
        let summary = Summary::of(&session);
        assert_eq!(
            summary.lines(),
            vec![
                "Photo Captured: Not yet",
                "Location Captured: Yes",
                "Coordinates: 37.774930, -122.419416",
                "Accuracy: Within 15 meters",
            ]
        );
    }
}
