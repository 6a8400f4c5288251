// SPDX-License-Identifier: GPL-3.0-only

//! Captured data for the lifetime of one run
//!
//! A [`Session`] holds at most one photo and one location fix. Each is
//! replaced wholesale by its setter and never mutated in place; nothing is
//! written to disk unless the user exports it.

use crate::errors::PhotoError;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;

/// Prefix of a PNG data URL
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// One encoded still image
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoCapture {
    data_url: String,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
}

impl PhotoCapture {
    /// Wrap PNG bytes as a self-describing data URL
    pub fn from_png(png: &[u8], width: u32, height: u32, captured_at: DateTime<Local>) -> Self {
        Self {
            data_url: format!("{}{}", PNG_DATA_URL_PREFIX, BASE64.encode(png)),
            width,
            height,
            captured_at,
        }
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Decode the data URL back into PNG bytes
    pub fn png_bytes(&self) -> Result<Vec<u8>, PhotoError> {
        let payload = self
            .data_url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or_else(|| PhotoError::DecodeFailed("not a PNG data URL".to_string()))?;
        BASE64
            .decode(payload)
            .map_err(|e| PhotoError::DecodeFailed(e.to_string()))
    }
}

/// A single position estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationFix {
    /// Degrees, full precision
    pub latitude: f64,
    /// Degrees, full precision
    pub longitude: f64,
    /// Accuracy radius rounded to the nearest meter
    pub accuracy_meters: u32,
}

impl LocationFix {
    /// Build a fix from raw provider values
    ///
    /// Accuracy is rounded once here and stored as whole meters; negative or
    /// non-finite accuracies clamp to zero.
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        let accuracy_meters = if accuracy.is_finite() && accuracy > 0.0 {
            accuracy.round().min(u32::MAX as f64) as u32
        } else {
            0
        };
        Self {
            latitude,
            longitude,
            accuracy_meters,
        }
    }

    /// Map deep link for these coordinates
    pub fn map_link(&self, map_base_url: &str) -> String {
        format!(
            "{}?q={},{}",
            map_base_url.trim_end_matches('/'),
            self.latitude,
            self.longitude
        )
    }
}

/// Photo and location captured so far
///
/// Cloning is cheap and yields an immutable snapshot for rendering or export.
#[derive(Debug, Clone, Default)]
pub struct Session {
    photo: Option<Arc<PhotoCapture>>,
    location: Option<LocationFix>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photo(&self) -> Option<&PhotoCapture> {
        self.photo.as_deref()
    }

    pub fn location(&self) -> Option<&LocationFix> {
        self.location.as_ref()
    }

    /// Replace the stored photo
    pub fn set_photo(&mut self, photo: PhotoCapture) {
        self.photo = Some(Arc::new(photo));
    }

    /// Replace the stored location fix
    pub fn set_location(&mut self, fix: LocationFix) {
        self.location = Some(fix);
    }

    /// True once either entity exists
    pub fn has_data(&self) -> bool {
        self.photo.is_some() || self.location.is_some()
    }
}
