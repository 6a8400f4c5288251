// SPDX-License-Identifier: GPL-3.0-only

//! Still photo capture
//!
//! ```text
//! Live frame → Rasterize (native size) → PNG → data URL
//! ```
//!
//! The live stream keeps running; capture only reads the newest frame.

pub mod encoding;
pub mod processing;

pub use encoding::encode_png;
pub use processing::rasterize;

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use crate::session::PhotoCapture;
use tracing::info;

/// Turn the current frame into a stored still
pub fn capture_still(frame: &CameraFrame) -> Result<PhotoCapture, PhotoError> {
    let image = rasterize(frame)?;
    let png = encode_png(&image)?;

    info!(
        width = image.width(),
        height = image.height(),
        bytes = png.len(),
        "Photo captured"
    );
    Ok(PhotoCapture::from_png(
        &png,
        image.width(),
        image.height(),
        chrono::Local::now(),
    ))
}
