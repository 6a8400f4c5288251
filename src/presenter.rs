// SPDX-License-Identifier: GPL-3.0-only

//! Presentation boundary
//!
//! Controllers never touch the display directly. They report through a
//! [`Presenter`], which the terminal UI, the headless commands and the tests
//! implement.

use crate::errors::ErrorKind;
use crate::session::{LocationFix, PhotoCapture};
use crate::summary::Summary;

/// User-triggerable actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StartCamera,
    TakePhoto,
    GetLocation,
    DownloadReport,
    SavePhoto,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::StartCamera => "Start Camera",
            Action::TakePhoto => "Take Photo",
            Action::GetLocation => "Get Location",
            Action::DownloadReport => "Download Data",
            Action::SavePhoto => "Save Photo",
        }
    }

    /// Label once the action reached `state`
    pub fn label_for(&self, state: ActionState) -> &'static str {
        match (self, state) {
            (Action::StartCamera, ActionState::Done) => "Camera Active",
            (Action::GetLocation, ActionState::Done) => "Location Acquired",
            _ => self.label(),
        }
    }
}

/// Availability of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Can be triggered
    Available,
    /// Not offered yet
    Unavailable,
    /// Completed and no longer offered
    Done,
}

impl ActionState {
    pub fn is_available(&self) -> bool {
        matches!(self, ActionState::Available)
    }
}

/// Location progress shown next to the location fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    Pending,
    Acquired,
}

impl LocationStatus {
    pub fn message(&self) -> &'static str {
        match self {
            LocationStatus::Pending => "Getting location...",
            LocationStatus::Acquired => "Location acquired successfully!",
        }
    }
}

/// Location fields as displayed
#[derive(Debug, Clone, PartialEq)]
pub struct LocationView {
    pub latitude: String,
    pub longitude: String,
    pub accuracy_meters: u32,
    pub map_link: String,
}

impl LocationView {
    pub fn new(fix: &LocationFix, map_base_url: &str) -> Self {
        Self {
            latitude: crate::summary::display_coordinate(fix.latitude),
            longitude: crate::summary::display_coordinate(fix.longitude),
            accuracy_meters: fix.accuracy_meters,
            map_link: fix.map_link(map_base_url),
        }
    }
}

/// Display surface used by the controllers
pub trait Presenter {
    /// Replace the summary block
    fn render(&mut self, summary: &Summary);

    /// Surface an error raised by `origin`
    fn show_error(&mut self, origin: Action, kind: ErrorKind, message: &str);

    /// Transient confirmation message
    fn show_notice(&mut self, message: &str);

    fn set_action(&mut self, action: Action, state: ActionState);

    fn show_location_status(&mut self, status: LocationStatus);

    fn show_location(&mut self, view: &LocationView);

    /// Show the captured still in the photo preview
    fn show_photo(&mut self, photo: &PhotoCapture);
}

/// Line-oriented presenter for headless commands
///
/// Errors always go to stderr. A quiet presenter prints nothing else, so
/// stdout stays free for machine-readable output.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    last_summary: Vec<String>,
    quiet: bool,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// Most recently rendered summary lines
    pub fn summary_lines(&self) -> &[String] {
        &self.last_summary
    }
}

impl Presenter for ConsolePresenter {
    fn render(&mut self, summary: &Summary) {
        self.last_summary = summary.lines();
    }

    fn show_error(&mut self, origin: Action, kind: ErrorKind, message: &str) {
        let hint = if kind.is_retryable() {
            ""
        } else {
            " (not retryable)"
        };
        eprintln!("{}: Error: {}{}", origin.label(), message, hint);
    }

    fn show_notice(&mut self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    fn set_action(&mut self, _action: Action, _state: ActionState) {}

    fn show_location_status(&mut self, status: LocationStatus) {
        if !self.quiet {
            println!("{}", status.message());
        }
    }

    fn show_location(&mut self, view: &LocationView) {
        if self.quiet {
            return;
        }
        println!("Latitude:  {}", view.latitude);
        println!("Longitude: {}", view.longitude);
        println!("Accuracy:  {} meters", view.accuracy_meters);
        println!("Map:       {}", view.map_link);
    }

    fn show_photo(&mut self, photo: &PhotoCapture) {
        if !self.quiet {
            println!("Photo: {}x{} PNG", photo.width, photo.height);
        }
    }
}
