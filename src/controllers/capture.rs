// SPDX-License-Identifier: GPL-3.0-only

//! Camera start and still capture

use crate::backends::camera::{CameraFrame, LiveStream, MediaDevice, StreamFuture, StreamRequest};
use crate::errors::{CameraError, PhotoError};
use crate::pipelines::photo;
use crate::presenter::{Action, ActionState, Presenter};
use crate::session::Session;
use crate::summary;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const PHOTO_CAPTURED: &str = "Photo captured successfully!";

enum CameraState {
    Ready,
    Starting,
    Active(Box<dyn LiveStream>),
}

/// Owns the live stream and turns frames into stills
pub struct CaptureController {
    device: Arc<dyn MediaDevice>,
    request: StreamRequest,
    state: CameraState,
}

impl CaptureController {
    pub fn new(device: Arc<dyn MediaDevice>, request: StreamRequest) -> Self {
        Self {
            device,
            request,
            state: CameraState::Ready,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CameraState::Active(_))
    }

    pub fn is_starting(&self) -> bool {
        matches!(self.state, CameraState::Starting)
    }

    /// Name of the live source, once active
    pub fn stream_label(&self) -> Option<&str> {
        match &self.state {
            CameraState::Active(stream) => Some(stream.label()),
            _ => None,
        }
    }

    /// Start acquiring the camera
    ///
    /// Returns `None` when a stream is already active or being acquired.
    pub fn begin_start_camera(&mut self, presenter: &mut dyn Presenter) -> Option<StreamFuture> {
        match self.state {
            CameraState::Ready => {
                info!(request = ?self.request, "Starting camera");
                self.state = CameraState::Starting;
                presenter.set_action(Action::StartCamera, ActionState::Unavailable);
                Some(self.device.open(&self.request))
            }
            CameraState::Starting => {
                debug!("Camera start already in flight");
                None
            }
            CameraState::Active(_) => {
                debug!("Camera already active");
                None
            }
        }
    }

    /// Apply the outcome of [`begin_start_camera`](Self::begin_start_camera)
    pub fn complete_start_camera(
        &mut self,
        result: Result<Box<dyn LiveStream>, CameraError>,
        presenter: &mut dyn Presenter,
    ) {
        if !self.is_starting() {
            warn!("Camera start completed without a pending start, ignoring");
            return;
        }

        match result {
            Ok(stream) => {
                info!(source = stream.label(), "Camera active");
                self.state = CameraState::Active(stream);
                presenter.set_action(Action::StartCamera, ActionState::Done);
                presenter.set_action(Action::TakePhoto, ActionState::Available);
            }
            Err(e) => {
                error!(error = %e, "Error accessing the camera");
                self.state = CameraState::Ready;
                presenter.set_action(Action::StartCamera, ActionState::Available);
                presenter.show_error(Action::StartCamera, e.kind(), &e.user_message());
            }
        }
    }

    /// Start the camera and wait for the outcome
    pub async fn start_camera(&mut self, presenter: &mut dyn Presenter) {
        if let Some(pending) = self.begin_start_camera(presenter) {
            let result = pending.await;
            self.complete_start_camera(result, presenter);
        }
    }

    /// Pull new frames and return the newest one for the live preview
    pub fn poll_preview(&mut self) -> Option<&CameraFrame> {
        match &mut self.state {
            CameraState::Active(stream) => {
                stream.refresh();
                stream.current_frame()
            }
            _ => None,
        }
    }

    /// Freeze the current frame into the session's photo
    pub fn capture_photo(&mut self, session: &mut Session, presenter: &mut dyn Presenter) {
        let still = match &mut self.state {
            CameraState::Active(stream) => {
                stream.refresh();
                stream
                    .current_frame()
                    .ok_or(PhotoError::NoFrameAvailable)
                    .and_then(photo::capture_still)
            }
            _ => Err(PhotoError::CameraNotStarted),
        };

        match still {
            Ok(capture) => {
                session.set_photo(capture);
                if let Some(stored) = session.photo() {
                    presenter.show_photo(stored);
                }
                summary::refresh(session, presenter);
                presenter.show_notice(PHOTO_CAPTURED);
            }
            Err(e) => {
                warn!(error = %e, "Photo capture failed");
                presenter.show_error(Action::TakePhoto, e.kind(), &e.user_message());
            }
        }
    }
}
