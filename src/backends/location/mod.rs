// SPDX-License-Identifier: GPL-3.0-only

//! Geolocation backend abstraction
//!
//! A [`GeolocationProvider`] answers one-shot position requests. Each request
//! is independent; a provider never pushes updates on its own.

pub mod geoclue;

pub use geoclue::GeoClueProvider;

use crate::errors::LocationError;
use futures::future::BoxFuture;
use std::fmt;
use std::time::Duration;

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask for the most precise source available
    pub high_accuracy: bool,
    /// Give up after this long
    pub timeout: Duration,
    /// Accept a cached position no older than this; zero means always fresh
    pub max_cache_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        use crate::constants::location;
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(location::TIMEOUT_MS),
            max_cache_age: Duration::from_millis(location::MAX_CACHE_AGE_MS),
        }
    }
}

/// A raw position as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius of the 68% confidence circle, in meters
    pub accuracy: f64,
}

/// Why a position request failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
    Other(String),
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::PermissionDenied => write!(f, "permission denied"),
            PositionError::PositionUnavailable => write!(f, "position unavailable"),
            PositionError::Timeout => write!(f, "timeout"),
            PositionError::Unsupported => write!(f, "no location service"),
            PositionError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for PositionError {}

impl From<PositionError> for LocationError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => LocationError::PermissionDenied,
            PositionError::PositionUnavailable => LocationError::PositionUnavailable,
            PositionError::Timeout => LocationError::Timeout,
            PositionError::Unsupported => LocationError::Unsupported,
            PositionError::Other(msg) => LocationError::Unknown(msg),
        }
    }
}

/// Pending position request
pub type PositionFuture = BoxFuture<'static, Result<Position, PositionError>>;

/// Source of device positions
pub trait GeolocationProvider: Send + Sync {
    /// Whether a location service exists at all
    fn is_supported(&self) -> bool;

    /// Request the current position once
    fn current_position(&self, options: PositionOptions) -> PositionFuture;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.max_cache_age, Duration::ZERO);
    }

    #[test]
    fn test_position_error_maps_to_location_error() {
        assert_eq!(
            LocationError::from(PositionError::PermissionDenied),
            LocationError::PermissionDenied
        );
        assert_eq!(LocationError::from(PositionError::Timeout), LocationError::Timeout);
        assert_eq!(
            LocationError::from(PositionError::Other("x".into())),
            LocationError::Unknown("x".into())
        );
    }
}
