// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use std::sync::Arc;
use std::time::Instant;

/// Frame data storage - pre-copied bytes shared by reference counting
#[derive(Clone)]
pub struct FrameData(Arc<[u8]>);

impl From<Vec<u8>> for FrameData {
    fn from(data: Vec<u8>) -> Self {
        FrameData(Arc::from(data.into_boxed_slice()))
    }
}

impl From<&[u8]> for FrameData {
    fn from(data: &[u8]) -> Self {
        FrameData(Arc::from(data))
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameData({} bytes)", self.0.len())
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// PipeWire target (`pipewire-serial-N`, `pipewire-N` or empty for auto-select)
    pub path: String,
    /// PipeWire node ID, used for format enumeration
    pub node_id: Option<String>,
    /// Mounting location reported by libcamera: "front", "back" or "external"
    pub location: Option<String>,
}

/// Framerate as a fraction (numerator/denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Rounded integer frames per second
    pub fn as_int(&self) -> u32 {
        (self.num + self.denom / 2) / self.denom
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{:.2}", self.num as f64 / self.denom as f64)
        }
    }
}

/// One format a camera offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    /// None when the device negotiates framerate itself (libcamera)
    pub framerate: Option<Framerate>,
    /// FourCC or GStreamer format name (e.g., "MJPG", "YUY2", "NV12")
    pub pixel_format: String,
}

impl CameraFormat {
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = &self.framerate {
            write!(f, "{}x{} @ {}fps {}", self.width, self.height, fps, self.pixel_format)
        } else {
            write!(f, "{}x{} {}", self.width, self.height, self.pixel_format)
        }
    }
}

/// A single RGBA frame from a live stream
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: FrameData,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: FrameData::from(data),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// RGB value at (x, y), clamped to the frame; black if the data is short
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y as usize) * (self.stride as usize) + (x as usize) * 4;
        match self.data.get(idx..idx + 3) {
            Some(&[r, g, b]) => (r, g, b),
            _ => (0, 0, 0),
        }
    }
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to initialize backend
    InitializationFailed(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<BackendError> for crate::errors::CameraError {
    fn from(err: BackendError) -> Self {
        use crate::errors::CameraError;
        match err {
            BackendError::NotAvailable(_) => CameraError::NoCameraFound,
            BackendError::InitializationFailed(msg) => {
                CameraError::from_backend_message(&msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framerate_as_int() {
        assert_eq!(Framerate::new(30, 1).as_int(), 30);
        assert_eq!(Framerate::new(60000, 1001).as_int(), 60);
        assert_eq!(Framerate::new(15, 0).denom, 1);
    }

    #[test]
    fn test_rgb_at_respects_stride() {
        // 2x2 RGBA with 4 bytes of row padding
        let mut data = vec![0u8; 12 * 2];
        data[12 + 4..12 + 8].copy_from_slice(&[10, 20, 30, 255]);
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: FrameData::from(data),
            stride: 12,
            captured_at: Instant::now(),
        };
        assert_eq!(frame.rgb_at(1, 1), (10, 20, 30));
        assert_eq!(frame.rgb_at(5, 5), (10, 20, 30));
        assert_eq!(frame.rgb_at(0, 0), (0, 0, 0));
    }
}
