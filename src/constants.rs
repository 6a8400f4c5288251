// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application identifier used for config/cache directories and GeoClue
pub const APP_ID: &str = "geosnap";

/// Camera request defaults
pub mod camera {
    /// Preferred stream width
    pub const IDEAL_WIDTH: u32 = 1280;
    /// Preferred stream height
    pub const IDEAL_HEIGHT: u32 = 720;
    /// Frames to let pass before a headless snapshot
    pub const DEFAULT_WARMUP_MS: u64 = 500;
    /// Upper bound for waiting on the first frame in headless mode
    pub const FIRST_FRAME_TIMEOUT_MS: u64 = 5_000;
}

/// Geolocation request defaults
pub mod location {
    /// Request timeout
    pub const TIMEOUT_MS: u64 = 10_000;
    /// Maximum age of a cached position (0 = always fresh)
    pub const MAX_CACHE_AGE_MS: u64 = 0;
    /// Decimal places for displayed coordinates
    pub const DISPLAY_DECIMALS: usize = 6;
    /// GeoClue accuracy level for high accuracy requests (GCLUE_ACCURACY_LEVEL_EXACT)
    pub const GEOCLUE_LEVEL_EXACT: u32 = 8;
    /// GeoClue accuracy level otherwise (GCLUE_ACCURACY_LEVEL_STREET_LEVEL)
    pub const GEOCLUE_LEVEL_STREET: u32 = 6;
    /// Bound on each `Stop`/`DeleteClient` call once a request is over
    pub const CLIENT_RELEASE_TIMEOUT_MS: u64 = 1_000;
}

/// Report export
pub mod export {
    /// First line of every report
    pub const REPORT_HEADER: &str = "=== GPS & Camera Data Capture ===";
    /// Report file name prefix
    pub const FILE_PREFIX: &str = "captured_data_";
    /// Report file extension
    pub const FILE_EXTENSION: &str = "txt";
    /// Default map provider used for deep links
    pub const DEFAULT_MAP_BASE_URL: &str = "https://www.google.com/maps";
    /// en-US style local date/time, matching what browsers show by default
    pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
    /// Prefix for saved photos
    pub const PHOTO_PREFIX: &str = "IMG_";
}

/// GStreamer pipeline tuning
pub mod pipeline {
    /// Frames kept by the appsink before dropping
    pub const MAX_BUFFERS: u32 = 2;
    /// Frame channel capacity between appsink and consumer
    pub const FRAME_CHANNEL_CAPACITY: usize = 4;
}

/// Timing values
pub mod timing {
    /// Pipeline start state-change timeout
    pub const START_TIMEOUT_SECS: u64 = 5;
    /// Pipeline stop state-change timeout
    pub const STOP_TIMEOUT_SECS: u64 = 2;
    /// Log a frame line every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 120;
}

/// Terminal UI refresh interval
pub const UI_TICK: Duration = Duration::from_millis(33);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_defaults() {
        assert_eq!(location::TIMEOUT_MS, 10_000);
        assert_eq!(location::MAX_CACHE_AGE_MS, 0);
        assert!(location::GEOCLUE_LEVEL_EXACT > location::GEOCLUE_LEVEL_STREET);
    }

    #[test]
    fn test_ideal_resolution() {
        assert_eq!((camera::IDEAL_WIDTH, camera::IDEAL_HEIGHT), (1280, 720));
    }
}
