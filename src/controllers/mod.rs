// SPDX-License-Identifier: GPL-3.0-only

//! Controllers for the four user actions
//!
//! Each controller owns its own small state and reports exclusively through a
//! [`Presenter`](crate::presenter::Presenter). Asynchronous operations come in
//! two halves: `begin_*` checks the guards and hands back a `'static` future,
//! `complete_*` applies its result. The caller decides where the future runs,
//! so results are always applied by the single owner of the
//! [`Session`](crate::session::Session).

pub mod capture;
pub mod export;
pub mod location;

pub use capture::CaptureController;
pub use export::ExportController;
pub use location::LocationController;
