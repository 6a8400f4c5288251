// SPDX-License-Identifier: MPL-2.0

//! End-to-end flows through the controllers with faked platform seams

mod common;

use chrono::{Local, TimeZone};
use common::{MemorySaver, RecordingPresenter, ScriptedDevice, ScriptedProvider, position};
use geosnap::backends::camera::StreamRequest;
use geosnap::backends::location::{PositionError, PositionOptions};
use geosnap::controllers::{CaptureController, ExportController, LocationController};
use geosnap::errors::{CameraError, ErrorKind};
use geosnap::presenter::{Action, ActionState};
use geosnap::session::Session;
use geosnap::summary::{self, Summary};
use std::sync::Arc;

const MAPS: &str = "https://www.google.com/maps";
const DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

fn capture_controller(device: ScriptedDevice) -> CaptureController {
    CaptureController::new(Arc::new(device), StreamRequest::default())
}

fn location_controller(provider: ScriptedProvider) -> LocationController {
    LocationController::new(Arc::new(provider), PositionOptions::default(), MAPS)
}

#[tokio::test]
async fn test_photo_only_flow() {
    let mut session = Session::new();
    let mut presenter = RecordingPresenter::default();
    let mut capture = capture_controller(ScriptedDevice::streaming(640, 480));

    capture.start_camera(&mut presenter).await;
    assert!(capture.is_active());
    assert_eq!(presenter.state(Action::StartCamera), Some(ActionState::Done));
    assert_eq!(presenter.state(Action::TakePhoto), Some(ActionState::Available));

    capture.capture_photo(&mut session, &mut presenter);
    let photo = session.photo().expect("photo stored");
    assert_eq!((photo.width, photo.height), (640, 480));
    assert!(photo.data_url().starts_with("data:image/png;base64,"));
    assert_eq!(presenter.photos, 1);
    assert_eq!(presenter.notices, vec!["Photo captured successfully!"]);
    assert_eq!(
        presenter.summary_lines(),
        vec!["Photo Captured: Yes", "Location Captured: Not yet"]
    );
    assert_eq!(presenter.state(Action::DownloadReport), Some(ActionState::Available));

    let saver = MemorySaver::default();
    let export = ExportController::new(MAPS, DATE_FORMAT);
    let name = export.export_data(&session, &saver);

    assert!(name.starts_with("captured_data_") && name.ends_with(".txt"));
    let report = saver.text(0);
    assert!(report.contains("--- PHOTO DATA ---"));
    assert!(!report.contains("--- LOCATION DATA ---"));
}

#[tokio::test]
async fn test_capture_without_stream_is_a_usage_error() {
    let mut session = Session::new();
    let mut presenter = RecordingPresenter::default();
    let mut capture = capture_controller(ScriptedDevice::streaming(64, 48));

    capture.capture_photo(&mut session, &mut presenter);

    assert!(session.photo().is_none());
    assert!(presenter.summaries.is_empty(), "Summary must not change");
    assert_eq!(
        presenter.errors,
        vec![(
            Action::TakePhoto,
            ErrorKind::Usage,
            "Please start the camera first.".to_string()
        )]
    );
}

#[tokio::test]
async fn test_camera_failure_keeps_start_available() {
    let mut presenter = RecordingPresenter::default();
    let mut capture = capture_controller(ScriptedDevice::failing(CameraError::PermissionDenied));

    capture.start_camera(&mut presenter).await;

    assert!(!capture.is_active());
    assert_eq!(presenter.state(Action::StartCamera), Some(ActionState::Available));
    assert_eq!(presenter.state(Action::TakePhoto), None);
    let (origin, kind, message) = &presenter.errors[0];
    assert_eq!(*origin, Action::StartCamera);
    assert_eq!(*kind, ErrorKind::Permission);
    assert!(message.contains("granted permission"));
}

#[tokio::test]
async fn test_start_while_starting_is_rejected() {
    let device = Arc::new(ScriptedDevice::streaming(64, 48));
    let mut presenter = RecordingPresenter::default();
    let mut capture = CaptureController::new(device.clone(), StreamRequest::default());

    let first = capture.begin_start_camera(&mut presenter);
    assert!(first.is_some());
    assert!(capture.is_starting());
    assert!(capture.begin_start_camera(&mut presenter).is_none());
    assert_eq!(device.opens(), 1);

    let result = first.unwrap().await;
    capture.complete_start_camera(result, &mut presenter);
    assert!(capture.is_active());
    assert!(capture.begin_start_camera(&mut presenter).is_none());
    assert_eq!(device.opens(), 1);
}

#[tokio::test]
async fn test_report_contains_location_then_photo() {
    let mut session = Session::new();
    let mut presenter = RecordingPresenter::default();
    let mut capture = capture_controller(ScriptedDevice::streaming(32, 24));
    let mut location = location_controller(ScriptedProvider::new(vec![Ok(position(
        48.8584, 2.2945, 12.4,
    ))]));

    capture.start_camera(&mut presenter).await;
    capture.capture_photo(&mut session, &mut presenter);
    location.request_location(&mut session, &mut presenter).await;

    let saver = MemorySaver::default();
    let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    ExportController::new(MAPS, DATE_FORMAT).export_data_at(&session, &saver, at);

    let report = saver.text(0);
    let location_at = report.find("--- LOCATION DATA ---").expect("location section");
    let photo_at = report.find("--- PHOTO DATA ---").expect("photo section");
    assert!(location_at < photo_at);

    let date = report
        .lines()
        .find_map(|line| line.strip_prefix("Date: "))
        .expect("date line");
    assert_eq!(date, "3/9/2024, 2:05:07 PM");
    assert!(report.contains("Accuracy: 12 meters"));
    assert!(report.contains("Map Link: https://www.google.com/maps?q=48.8584,2.2945"));
}

#[tokio::test]
async fn test_coordinates_rounded_for_display_only() {
    let mut session = Session::new();
    let mut presenter = RecordingPresenter::default();
    let mut location = location_controller(ScriptedProvider::new(vec![Ok(position(
        37.7749295,
        -122.4194155,
        20.0,
    ))]));

    location.request_location(&mut session, &mut presenter).await;

    let view = &presenter.locations[0];
    assert_eq!(view.latitude, "37.774930");
    assert_eq!(view.longitude, "-122.419416");
    assert!(
        presenter
            .summary_lines()
            .contains(&"Coordinates: 37.774930, -122.419416".to_string())
    );

    let saver = MemorySaver::default();
    ExportController::new(MAPS, DATE_FORMAT).export_data(&session, &saver);
    let report = saver.text(0);
    assert!(report.contains("Latitude: 37.7749295"));
    assert!(report.contains("Longitude: -122.4194155"));
}

#[tokio::test]
async fn test_summary_flags_follow_session() {
    let mut session = Session::new();
    let mut presenter = RecordingPresenter::default();
    let mut capture = capture_controller(ScriptedDevice::streaming(16, 16));
    let mut location = location_controller(ScriptedProvider::new(vec![
        Err(PositionError::Timeout),
        Ok(position(1.0, 2.0, 3.0)),
    ]));

    fn check(session: &Session, presenter: &RecordingPresenter) {
        let shown = presenter.summaries.last().expect("a summary was rendered");
        assert_eq!(shown.photo_captured(), session.photo().is_some());
        assert_eq!(shown.location_captured(), session.location().is_some());
        assert_eq!(*shown, Summary::of(session));
    }

    summary::refresh(&session, &mut presenter);
    check(&session, &presenter);

    capture.capture_photo(&mut session, &mut presenter);
    check(&session, &presenter);

    location.request_location(&mut session, &mut presenter).await;
    check(&session, &presenter);

    capture.start_camera(&mut presenter).await;
    capture.capture_photo(&mut session, &mut presenter);
    check(&session, &presenter);
    assert!(presenter.summaries.last().unwrap().photo_captured());

    location.request_location(&mut session, &mut presenter).await;
    check(&session, &presenter);
    assert!(presenter.summaries.last().unwrap().location_captured());

    assert!(session.photo().is_some() && session.location().is_some());
}

#[tokio::test]
async fn test_export_stays_available_after_failures() {
    let mut session = Session::new();
    let mut presenter = RecordingPresenter::default();
    let mut capture = capture_controller(ScriptedDevice::streaming(16, 16));
    let mut location = location_controller(ScriptedProvider::new(vec![
        Err(PositionError::PermissionDenied),
        Err(PositionError::PositionUnavailable),
    ]));

    assert_eq!(presenter.state(Action::DownloadReport), None);

    capture.start_camera(&mut presenter).await;
    capture.capture_photo(&mut session, &mut presenter);
    assert_eq!(presenter.state(Action::DownloadReport), Some(ActionState::Available));

    location.request_location(&mut session, &mut presenter).await;
    location.request_location(&mut session, &mut presenter).await;
    summary::refresh(&session, &mut presenter);

    assert_eq!(presenter.errors.len(), 2);
    assert_eq!(presenter.state(Action::DownloadReport), Some(ActionState::Available));
}

#[tokio::test]
async fn test_save_photo() {
    let mut session = Session::new();
    let mut presenter = RecordingPresenter::default();
    let saver = MemorySaver::default();
    let export = ExportController::new(MAPS, DATE_FORMAT);

    assert!(export.save_photo(&session, &saver, &mut presenter).is_none());
    assert_eq!(presenter.errors[0].0, Action::SavePhoto);
    assert_eq!(presenter.errors[0].1, ErrorKind::Usage);

    let mut capture = capture_controller(ScriptedDevice::streaming(8, 8));
    capture.start_camera(&mut presenter).await;
    capture.capture_photo(&mut session, &mut presenter);
    assert_eq!(presenter.state(Action::SavePhoto), Some(ActionState::Available));

    let name = export
        .save_photo(&session, &saver, &mut presenter)
        .expect("photo saved");
    assert!(name.starts_with("IMG_") && name.ends_with(".png"));

    let files = saver.files.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(&files[0].1[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_empty_report() {
    let saver = MemorySaver::default();
    ExportController::new(MAPS, DATE_FORMAT).export_data(&Session::new(), &saver);

    let report = saver.text(0);
    assert!(report.starts_with("=== GPS & Camera Data Capture ==="));
    assert!(report.contains("No data has been captured yet."));
}
