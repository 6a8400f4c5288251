// SPDX-License-Identifier: GPL-3.0-only

//! One-shot location acquisition

use crate::backends::location::{
    GeolocationProvider, Position, PositionError, PositionFuture, PositionOptions,
};
use crate::errors::LocationError;
use crate::presenter::{Action, ActionState, LocationStatus, LocationView, Presenter};
use crate::session::{LocationFix, Session};
use crate::summary;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Requests positions and stores successful fixes
///
/// Every request while the action is offered goes to the provider; results are
/// applied in the order they complete. A failure never touches a stored fix.
pub struct LocationController {
    provider: Arc<dyn GeolocationProvider>,
    options: PositionOptions,
    map_base_url: String,
    acquired: bool,
    pending: usize,
}

impl LocationController {
    pub fn new(
        provider: Arc<dyn GeolocationProvider>,
        options: PositionOptions,
        map_base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            options,
            map_base_url: map_base_url.into(),
            acquired: false,
            pending: 0,
        }
    }

    /// Whether a fix has been stored; the action is then no longer offered
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    /// Requests issued but not yet completed
    pub fn pending_requests(&self) -> usize {
        self.pending
    }

    /// Issue one request
    ///
    /// Returns `None` once a fix is stored, or when no location service exists
    /// (reported as unsupported without contacting the provider).
    pub fn begin_request(&mut self, presenter: &mut dyn Presenter) -> Option<PositionFuture> {
        if self.acquired {
            debug!("Location already acquired");
            return None;
        }

        presenter.show_location_status(LocationStatus::Pending);

        if !self.provider.is_supported() {
            let err = LocationError::Unsupported;
            warn!("Geolocation is not supported");
            presenter.show_error(Action::GetLocation, err.kind(), err.user_message());
            return None;
        }

        self.pending += 1;
        debug!(pending = self.pending, options = ?self.options, "Requesting location");
        Some(self.provider.current_position(self.options))
    }

    /// Apply the outcome of one [`begin_request`](Self::begin_request)
    pub fn complete_request(
        &mut self,
        result: Result<Position, PositionError>,
        session: &mut Session,
        presenter: &mut dyn Presenter,
    ) {
        self.pending = self.pending.saturating_sub(1);

        match result {
            Ok(position) => {
                let fix = LocationFix::new(position.latitude, position.longitude, position.accuracy);
                info!(accuracy_meters = fix.accuracy_meters, "Location acquired");
                session.set_location(fix);
                self.acquired = true;

                presenter.show_location(&LocationView::new(&fix, &self.map_base_url));
                presenter.show_location_status(LocationStatus::Acquired);
                presenter.set_action(Action::GetLocation, ActionState::Done);
                summary::refresh(session, presenter);
            }
            Err(e) => {
                let err = LocationError::from(e);
                warn!(error = %err, "Location request failed");
                presenter.show_error(Action::GetLocation, err.kind(), err.user_message());
            }
        }
    }

    /// Issue one request and wait for it
    pub async fn request_location(&mut self, session: &mut Session, presenter: &mut dyn Presenter) {
        if let Some(pending) = self.begin_request(presenter) {
            let result = pending.await;
            self.complete_request(result, session, presenter);
        }
    }
}
