// SPDX-License-Identifier: MPL-2.0

//! Fakes for the platform seams shared by the integration tests

#![allow(dead_code)]

use futures::FutureExt;
use geosnap::backends::camera::{
    CameraFrame, LiveStream, MediaDevice, StreamFuture, StreamRequest,
};
use geosnap::backends::location::{
    GeolocationProvider, Position, PositionError, PositionFuture, PositionOptions,
};
use geosnap::errors::{CameraError, ErrorKind};
use geosnap::presenter::{Action, ActionState, LocationStatus, LocationView, Presenter};
use geosnap::session::PhotoCapture;
use geosnap::storage::FileSaver;
use geosnap::summary::Summary;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Solid-colour RGBA frame
pub fn solid_frame(width: u32, height: u32) -> CameraFrame {
    let data = [200u8, 40, 40, 255].repeat((width * height) as usize);
    CameraFrame::from_rgba(width, height, data)
}

pub struct FakeStream {
    pub frame: Option<CameraFrame>,
}

impl LiveStream for FakeStream {
    fn label(&self) -> &str {
        "Fake Camera"
    }

    fn refresh(&mut self) {}

    fn current_frame(&self) -> Option<&CameraFrame> {
        self.frame.as_ref()
    }
}

/// Camera that answers every open with the same outcome
pub struct ScriptedDevice {
    outcome: Result<(u32, u32), CameraError>,
    pub opens: AtomicUsize,
}

impl ScriptedDevice {
    pub fn streaming(width: u32, height: u32) -> Self {
        Self {
            outcome: Ok((width, height)),
            opens: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: CameraError) -> Self {
        Self {
            outcome: Err(error),
            opens: AtomicUsize::new(0),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl MediaDevice for ScriptedDevice {
    fn open(&self, _request: &StreamRequest) -> StreamFuture {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        async move {
            outcome.map(|(width, height)| {
                Box::new(FakeStream {
                    frame: Some(solid_frame(width, height)),
                }) as Box<dyn LiveStream>
            })
        }
        .boxed()
    }
}

/// Geolocation provider that hands out queued results in request order
pub struct ScriptedProvider {
    supported: bool,
    results: Mutex<VecDeque<Result<Position, PositionError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(results: Vec<Result<Position, PositionError>>) -> Self {
        Self {
            supported: true,
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            results: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeolocationProvider for ScriptedProvider {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn current_position(&self, _options: PositionOptions) -> PositionFuture {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(PositionError::PositionUnavailable));
        async move { result }.boxed()
    }
}

pub fn position(latitude: f64, longitude: f64, accuracy: f64) -> Position {
    Position {
        latitude,
        longitude,
        accuracy,
    }
}

/// Keeps every saved file in memory
#[derive(Default)]
pub struct MemorySaver {
    pub files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySaver {
    pub fn names(&self) -> Vec<String> {
        self.files.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn text(&self, index: usize) -> String {
        String::from_utf8(self.files.lock().unwrap()[index].1.clone()).unwrap()
    }
}

impl FileSaver for MemorySaver {
    fn save(&self, suggested_name: &str, content: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .push((suggested_name.to_string(), content.to_vec()));
    }
}

/// Records everything the controllers report
#[derive(Default)]
pub struct RecordingPresenter {
    pub summaries: Vec<Summary>,
    pub errors: Vec<(Action, ErrorKind, String)>,
    pub notices: Vec<String>,
    pub actions: HashMap<Action, ActionState>,
    pub statuses: Vec<LocationStatus>,
    pub locations: Vec<LocationView>,
    pub photos: usize,
}

impl RecordingPresenter {
    pub fn state(&self, action: Action) -> Option<ActionState> {
        self.actions.get(&action).copied()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.summaries.last().map(Summary::lines).unwrap_or_default()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, summary: &Summary) {
        self.summaries.push(summary.clone());
    }

    fn show_error(&mut self, origin: Action, kind: ErrorKind, message: &str) {
        self.errors.push((origin, kind, message.to_string()));
    }

    fn show_notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn set_action(&mut self, action: Action, state: ActionState) {
        self.actions.insert(action, state);
    }

    fn show_location_status(&mut self, status: LocationStatus) {
        self.statuses.push(status);
    }

    fn show_location(&mut self, view: &LocationView) {
        self.locations.push(view.clone());
    }

    fn show_photo(&mut self, _photo: &PhotoCapture) {
        self.photos += 1;
    }
}
