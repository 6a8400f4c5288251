// SPDX-License-Identifier: GPL-3.0-only

//! Terminal application state and input handling
//!
//! The UI loop is the only writer of the [`Session`]. Camera starts and
//! location requests run on the tokio runtime; their results come back over a
//! channel and are applied in [`App::tick`].

use crate::backends::camera::{CameraFrame, LiveStream, MediaDevice, StreamRequest};
use crate::backends::location::{GeolocationProvider, Position, PositionError};
use crate::config::Config;
use crate::controllers::{CaptureController, ExportController, LocationController};
use crate::errors::{CameraError, ErrorKind};
use crate::presenter::{Action, ActionState, LocationStatus, LocationView, Presenter};
use crate::session::{PhotoCapture, Session};
use crate::storage::DirectorySaver;
use crate::summary::{self, Summary};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::RgbaImage;
use ratatui::style::Color;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const PENDING_COLOR: Color = Color::Rgb(0xf3, 0x9c, 0x12);
const SUCCESS_COLOR: Color = Color::Rgb(0x27, 0xae, 0x60);
const ERROR_COLOR: Color = Color::Rgb(0xe7, 0x4c, 0x3c);

const PHOTO_THUMBNAIL_WIDTH: u32 = 320;
const PHOTO_THUMBNAIL_HEIGHT: u32 = 240;

const KEY_HINTS: &str = "'h' help | 'q' quit";
const HELP: &str = "c: Start camera | p: Take photo | l: Get location | d: Download data | \
                    s: Save photo | o: Open map | h: Toggle help | q/Ctrl+C: Quit";

/// Result of background work, applied on the UI loop
pub enum Completion {
    Camera(Result<Box<dyn LiveStream>, CameraError>),
    Location(Result<Position, PositionError>),
}

/// Everything the terminal shows; implements [`Presenter`]
pub struct TerminalView {
    actions: Vec<(Action, char, ActionState)>,
    pub(crate) summary: Summary,
    pub(crate) location_status: Option<(String, Color)>,
    pub(crate) location: Option<LocationView>,
    pub(crate) photo: Option<RgbaImage>,
    pub(crate) live: Option<CameraFrame>,
    pub(crate) status: (String, Color),
    pub(crate) show_help: bool,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            actions: vec![
                (Action::StartCamera, 'c', ActionState::Available),
                (Action::TakePhoto, 'p', ActionState::Unavailable),
                (Action::GetLocation, 'l', ActionState::Available),
                (Action::DownloadReport, 'd', ActionState::Unavailable),
                (Action::SavePhoto, 's', ActionState::Unavailable),
            ],
            summary: Summary::of(&Session::new()),
            location_status: None,
            location: None,
            photo: None,
            live: None,
            status: (KEY_HINTS.to_string(), Color::White),
            show_help: false,
        }
    }

    pub fn actions(&self) -> &[(Action, char, ActionState)] {
        &self.actions
    }

    pub fn action_state(&self, action: Action) -> ActionState {
        self.actions
            .iter()
            .find(|(a, _, _)| *a == action)
            .map(|(_, _, state)| *state)
            .unwrap_or(ActionState::Unavailable)
    }

    fn action_for_key(&self, key: char) -> Option<Action> {
        self.actions
            .iter()
            .find(|(_, k, _)| *k == key)
            .map(|(action, _, _)| *action)
    }

    fn set_status(&mut self, message: impl Into<String>, color: Color) {
        self.status = (message.into(), color);
    }

    /// Status line text, or the key help when toggled on
    pub fn status_line(&self) -> (&str, Color) {
        if self.show_help {
            (HELP, Color::White)
        } else {
            (&self.status.0, self.status.1)
        }
    }
}

impl Presenter for TerminalView {
    fn render(&mut self, summary: &Summary) {
        self.summary = summary.clone();
    }

    fn show_error(&mut self, origin: Action, kind: ErrorKind, message: &str) {
        let text = format!("Error: {}", message);
        if origin == Action::GetLocation {
            self.location_status = Some((text, ERROR_COLOR));
        } else {
            let hint = if kind.is_retryable() { "" } else { " (not retryable)" };
            self.set_status(format!("{}{}", text, hint), ERROR_COLOR);
        }
    }

    fn show_notice(&mut self, message: &str) {
        self.set_status(message, SUCCESS_COLOR);
    }

    fn set_action(&mut self, action: Action, state: ActionState) {
        if let Some(entry) = self.actions.iter_mut().find(|(a, _, _)| *a == action) {
            entry.2 = state;
        }
    }

    fn show_location_status(&mut self, status: LocationStatus) {
        let color = match status {
            LocationStatus::Pending => PENDING_COLOR,
            LocationStatus::Acquired => SUCCESS_COLOR,
        };
        self.location_status = Some((status.message().to_string(), color));
    }

    fn show_location(&mut self, view: &LocationView) {
        self.location = Some(view.clone());
    }

    fn show_photo(&mut self, photo: &PhotoCapture) {
        let decoded = photo
            .png_bytes()
            .map_err(|e| e.to_string())
            .and_then(|png| image::load_from_memory(&png).map_err(|e| e.to_string()));
        match decoded {
            Ok(image) => {
                self.photo = Some(
                    image
                        .thumbnail(PHOTO_THUMBNAIL_WIDTH, PHOTO_THUMBNAIL_HEIGHT)
                        .to_rgba8(),
                );
            }
            Err(e) => warn!(error = %e, "Failed to decode photo for preview"),
        }
    }
}

/// Interactive session state
pub struct App {
    session: Session,
    capture: CaptureController,
    location: LocationController,
    export: ExportController,
    saver: DirectorySaver,
    pub(crate) view: TerminalView,
    handle: Handle,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        device: Arc<dyn MediaDevice>,
        provider: Arc<dyn GeolocationProvider>,
        handle: Handle,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            capture: CaptureController::new(device, StreamRequest::from(&config.camera)),
            location: LocationController::new(
                provider,
                config.location.position_options(),
                config.export.map_base_url.clone(),
            ),
            export: ExportController::from_config(&config.export),
            saver: DirectorySaver::new(config.export.directory()),
            view: TerminalView::new(),
            handle,
            completions_tx,
            completions_rx,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply finished background work and pull the newest preview frame
    pub fn tick(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply(completion);
        }

        if let Some(frame) = self.capture.poll_preview() {
            self.view.live = Some(frame.clone());
        }
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Camera(result) => {
                self.capture.complete_start_camera(result, &mut self.view);
                if let Some(label) = self.capture.stream_label() {
                    self.view.set_status(format!("Camera: {}", label), SUCCESS_COLOR);
                }
            }
            Completion::Location(result) => {
                self.location
                    .complete_request(result, &mut self.session, &mut self.view);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let KeyCode::Char(c) = key.code else {
            return;
        };

        match c {
            'q' => self.should_quit = true,
            'h' => self.view.show_help = !self.view.show_help,
            'o' => self.open_map(),
            _ => {
                if let Some(action) = self.view.action_for_key(c) {
                    self.view.show_help = false;
                    self.trigger(action);
                }
            }
        }
    }

    /// Run an action if it is offered; Take Photo always reaches its controller
    fn trigger(&mut self, action: Action) {
        if action != Action::TakePhoto && !self.view.action_state(action).is_available() {
            debug!(?action, "Action not available");
            return;
        }

        match action {
            Action::StartCamera => self.start_camera(),
            Action::TakePhoto => self
                .capture
                .capture_photo(&mut self.session, &mut self.view),
            Action::GetLocation => self.request_location(),
            Action::DownloadReport => self.download_report(),
            Action::SavePhoto => {
                self.export
                    .save_photo(&self.session, &self.saver, &mut self.view);
            }
        }
    }

    fn start_camera(&mut self) {
        if let Some(pending) = self.capture.begin_start_camera(&mut self.view) {
            self.view.set_status("Starting camera...", PENDING_COLOR);
            let tx = self.completions_tx.clone();
            self.handle.spawn(async move {
                let _ = tx.send(Completion::Camera(pending.await));
            });
        }
    }

    fn request_location(&mut self) {
        if let Some(pending) = self.location.begin_request(&mut self.view) {
            let tx = self.completions_tx.clone();
            self.handle.spawn(async move {
                let _ = tx.send(Completion::Location(pending.await));
            });
        }
    }

    fn download_report(&mut self) {
        let name = self.export.export_data(&self.session, &self.saver);
        self.view.set_status(
            format!("Downloading {} to {}", name, self.saver.directory().display()),
            SUCCESS_COLOR,
        );
    }

    fn open_map(&mut self) {
        let Some(link) = self.view.location.as_ref().map(|l| l.map_link.clone()) else {
            self.view.set_status("No location to show yet", Color::White);
            return;
        };
        match open::that_detached(&link) {
            Ok(()) => info!(url = %link, "Opened map link"),
            Err(e) => {
                warn!(url = %link, error = %e, "Failed to open map link");
                self.view.set_status(format!("Map: {}", link), Color::White);
            }
        }
    }

    /// Re-render the summary from the current session
    pub fn refresh_summary(&mut self) {
        summary::refresh(&self.session, &mut self.view);
    }
}
