// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  CaptureController  │
//! └──────────┬──────────┘
//!            │ open(StreamRequest)
//!            ▼
//! ┌─────────────────────┐
//! │  MediaDevice Trait  │  ← one-shot acquisition future
//! └──────────┬──────────┘
//!            │ Box<dyn LiveStream>
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← GStreamer pipewiresrc → RGBA appsink
//!       └────────┘
//! ```

pub mod pipewire;
pub mod types;

pub use types::*;

use crate::errors::CameraError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Which way the requested camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Towards the user (front camera)
    #[default]
    User,
    /// Away from the user (rear camera)
    Environment,
}

impl FacingMode {
    /// Location string libcamera reports for this facing mode
    pub fn camera_location(&self) -> &'static str {
        match self {
            FacingMode::User => "front",
            FacingMode::Environment => "back",
        }
    }
}

/// Parameters of a stream acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    /// Explicit device path, bypassing facing-mode selection
    pub device: Option<String>,
}

impl From<&crate::config::CameraConfig> for StreamRequest {
    fn from(config: &crate::config::CameraConfig) -> Self {
        Self {
            facing: config.facing,
            ideal_width: config.ideal_width,
            ideal_height: config.ideal_height,
            device: config.device.clone(),
        }
    }
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self::from(&crate::config::CameraConfig::default())
    }
}

/// Pending stream acquisition
pub type StreamFuture = BoxFuture<'static, Result<Box<dyn LiveStream>, CameraError>>;

/// A camera capability that can hand out live streams
pub trait MediaDevice: Send + Sync {
    /// Start acquiring a stream; resolves once the stream is live or refused
    fn open(&self, request: &StreamRequest) -> StreamFuture;
}

/// A live, continuously updating video source
pub trait LiveStream: Send {
    /// Human-readable source name
    fn label(&self) -> &str;

    /// Pull everything delivered since the last call and keep the newest frame
    fn refresh(&mut self);

    /// Newest frame seen so far
    fn current_frame(&self) -> Option<&CameraFrame>;
}

/// Pick the camera for a request
///
/// An explicit device path wins, then a camera mounted on the requested side,
/// then the first camera.
pub fn select_device<'a>(
    cameras: &'a [CameraDevice],
    request: &StreamRequest,
) -> Option<&'a CameraDevice> {
    if let Some(path) = request.device.as_deref()
        && let Some(camera) = cameras.iter().find(|c| c.path == path || c.name == path)
    {
        return Some(camera);
    }

    let wanted = request.facing.camera_location();
    cameras
        .iter()
        .find(|c| c.location.as_deref() == Some(wanted))
        .or_else(|| cameras.first())
}

/// Pick the format closest to the ideal resolution without exceeding it
///
/// Exact match first, then the largest format that fits inside the ideal,
/// then the smallest format offered. Ties go to the higher framerate.
pub fn select_format(formats: &[CameraFormat], ideal_width: u32, ideal_height: u32) -> Option<CameraFormat> {
    let fps = |f: &CameraFormat| f.framerate.map(|r| r.as_int()).unwrap_or(0);

    if let Some(exact) = formats
        .iter()
        .filter(|f| f.width == ideal_width && f.height == ideal_height)
        .max_by_key(|f| fps(f))
    {
        return Some(exact.clone());
    }

    if let Some(fitting) = formats
        .iter()
        .filter(|f| f.width <= ideal_width && f.height <= ideal_height)
        .max_by_key(|f| (f.pixels(), fps(f)))
    {
        return Some(fitting.clone());
    }

    formats
        .iter()
        .min_by_key(|f| (f.pixels(), std::cmp::Reverse(fps(f))))
        .cloned()
}
