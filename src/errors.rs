// SPDX-License-Identifier: GPL-3.0-only

//! Error types for geosnap
//!
//! Every error is handled by the controller that raised it and surfaced
//! through the presenter. [`ErrorKind`] is the user-facing classification
//! that decides whether the action stays retryable.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Errors that stop the program before any capture starts
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid
    Config(String),
}

/// User-facing error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Access to the camera or location was denied
    Permission,
    /// Device, position or capability is not available
    Unavailable,
    /// The location request ran out of time
    Timeout,
    /// An action was attempted out of order
    Usage,
    /// Anything the platform did not classify
    Unknown,
}

impl ErrorKind {
    /// Whether the same action can be attempted again without outside changes
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorKind::Unavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Permission => write!(f, "permission"),
            ErrorKind::Unavailable => write!(f, "unavailable"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Usage => write!(f, "usage"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Camera access was refused
    PermissionDenied,
    /// No camera devices found
    NoCameraFound,
    /// Camera is busy or in use
    Busy,
    /// Camera pipeline could not be started
    InitializationFailed(String),
    /// Anything else reported by the backend
    Other(String),
}

/// Location-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The user or a policy agent refused location access
    PermissionDenied,
    /// The provider answered but could not produce a position
    PositionUnavailable,
    /// No position arrived within the configured timeout
    Timeout,
    /// No location service exists on this system
    Unsupported,
    /// Unclassified provider failure
    Unknown(String),
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// Capture attempted without an active stream
    CameraNotStarted,
    /// The stream has not delivered a frame yet
    NoFrameAvailable,
    /// Encoding failed
    EncodingFailed(String),
    /// The stored data URL could not be decoded
    DecodeFailed(String),
}

impl CameraError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CameraError::PermissionDenied => ErrorKind::Permission,
            CameraError::NoCameraFound | CameraError::Busy => ErrorKind::Unavailable,
            CameraError::InitializationFailed(_) | CameraError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            CameraError::PermissionDenied => {
                "Could not access the camera. Please make sure you have granted permission."
                    .to_string()
            }
            CameraError::NoCameraFound => {
                "No camera was found. Connect a camera and try again.".to_string()
            }
            CameraError::Busy => "The camera is in use by another application.".to_string(),
            CameraError::InitializationFailed(msg) | CameraError::Other(msg) => {
                format!("Could not access the camera: {}", msg)
            }
        }
    }

    /// Classify a GStreamer/PipeWire failure message
    pub fn from_backend_message(msg: &str) -> Self {
        let lower = msg.to_lowercase();
        if lower.contains("permission denied")
            || lower.contains("not authorized")
            || lower.contains("access denied")
        {
            CameraError::PermissionDenied
        } else if lower.contains("busy") || lower.contains("in use") {
            CameraError::Busy
        } else if lower.contains("no such file")
            || lower.contains("not found")
            || lower.contains("no camera")
        {
            CameraError::NoCameraFound
        } else {
            CameraError::InitializationFailed(msg.to_string())
        }
    }
}

impl LocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocationError::PermissionDenied => ErrorKind::Permission,
            LocationError::PositionUnavailable | LocationError::Unsupported => {
                ErrorKind::Unavailable
            }
            LocationError::Timeout => ErrorKind::Timeout,
            LocationError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Message shown in the location status line
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Permission denied. Please allow location access.",
            LocationError::PositionUnavailable => "Location information is unavailable.",
            LocationError::Timeout => "The request to get location timed out.",
            LocationError::Unsupported => "Geolocation is not supported on this system.",
            LocationError::Unknown(_) => "Unknown error",
        }
    }
}

impl PhotoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PhotoError::CameraNotStarted => ErrorKind::Usage,
            PhotoError::NoFrameAvailable => ErrorKind::Unavailable,
            PhotoError::EncodingFailed(_) | PhotoError::DecodeFailed(_) => ErrorKind::Unknown,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            PhotoError::CameraNotStarted => "Please start the camera first.".to_string(),
            PhotoError::NoFrameAvailable => {
                "The camera has not delivered a frame yet.".to_string()
            }
            PhotoError::EncodingFailed(msg) => format!("Could not encode the photo: {}", msg),
            PhotoError::DecodeFailed(msg) => format!("Could not read the photo: {}", msg),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => write!(f, "Camera permission denied"),
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::Busy => write!(f, "Camera is busy"),
            CameraError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            CameraError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "Location permission denied"),
            LocationError::PositionUnavailable => write!(f, "Position unavailable"),
            LocationError::Timeout => write!(f, "Location request timed out"),
            LocationError::Unsupported => write!(f, "Geolocation unsupported"),
            LocationError::Unknown(msg) => write!(f, "Unknown location error: {}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::CameraNotStarted => write!(f, "Camera not started"),
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::DecodeFailed(msg) => write!(f, "Decoding failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for LocationError {}
impl std::error::Error for PhotoError {}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::Permission.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::Usage.is_retryable());
        assert!(!ErrorKind::Unavailable.is_retryable());
    }

    #[test]
    fn test_location_messages() {
        assert_eq!(
            LocationError::PermissionDenied.user_message(),
            "Permission denied. Please allow location access."
        );
        assert_eq!(
            LocationError::Timeout.user_message(),
            "The request to get location timed out."
        );
        assert_eq!(
            LocationError::Unknown("boom".into()).user_message(),
            "Unknown error"
        );
    }

    #[test]
    fn test_backend_message_classification() {
        assert_eq!(
            CameraError::from_backend_message("Could not open: Permission denied"),
            CameraError::PermissionDenied
        );
        assert_eq!(
            CameraError::from_backend_message("Device or resource busy"),
            CameraError::Busy
        );
        assert_eq!(
            CameraError::from_backend_message("target object not found"),
            CameraError::NoCameraFound
        );
        assert!(matches!(
            CameraError::from_backend_message("negotiation failed"),
            CameraError::InitializationFailed(_)
        ));
    }

    #[test]
    fn test_unsupported_is_not_retryable() {
        assert_eq!(LocationError::Unsupported.kind(), ErrorKind::Unavailable);
        assert!(!LocationError::Unsupported.kind().is_retryable());
    }
}
