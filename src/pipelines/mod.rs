// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for captured media
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │ PNG data URL │
//! │   (RGBA)     │     │  - Rasterize      │     │              │
//! │              │     │  - PNG encoding   │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! - [`photo`]: still capture from the live stream

pub mod photo;
