// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera and location access
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Controllers                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                  │
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │     Camera       │  │    Location     │  │
//! │  │    (PipeWire)    │  │ (GeoClue/D-Bus) │  │
//! │  └──────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! - [`camera`]: device selection and live frame streams
//! - [`location`]: one-shot position requests

pub mod camera;
pub mod location;
