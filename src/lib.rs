// SPDX-License-Identifier: GPL-3.0-only

//! geosnap - capture a photo and a location fix, then export a text report
//!
//! The crate is organized into several modules:
//!
//! - [`session`]: the captured photo and location fix
//! - [`controllers`]: camera start and capture, location requests, export
//! - [`summary`] and [`report`]: pure renderings of a session
//! - [`presenter`]: the display boundary the controllers report through
//! - [`backends`]: PipeWire camera and GeoClue location access
//! - [`pipelines`]: still rasterization and PNG encoding
//! - [`storage`]: client-side file saving
//! - [`terminal`]: interactive terminal interface
//! - [`config`]: user configuration handling

pub mod backends;
pub mod config;
pub mod constants;
pub mod controllers;
pub mod errors;
pub mod logging;
pub mod pipelines;
pub mod presenter;
pub mod report;
pub mod session;
pub mod storage;
pub mod summary;
pub mod terminal;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use session::{LocationFix, PhotoCapture, Session};
