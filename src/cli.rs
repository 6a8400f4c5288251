// SPDX-License-Identifier: GPL-3.0-only

//! Headless commands
//!
//! - Listing available cameras
//! - Acquiring a single location fix
//! - Running the whole capture flow and exporting the report

use geosnap::backends::camera::pipewire::PipeWireDevice;
use geosnap::backends::camera::{CameraFormat, StreamRequest, select_device, select_format};
use geosnap::backends::location::{GeoClueProvider, PositionError};
use geosnap::config::Config;
use geosnap::constants::{UI_TICK, camera};
use geosnap::controllers::{CaptureController, ExportController, LocationController};
use geosnap::presenter::{ConsolePresenter, Presenter};
use geosnap::session::{LocationFix, Session};
use geosnap::storage::DirectorySaver;
use geosnap::summary;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let cameras = PipeWireDevice::new().list()?;
    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    let request = StreamRequest::from(&config.camera);
    let devices: Vec<_> = cameras.iter().map(|(device, _)| device.clone()).collect();
    let selected = select_device(&devices, &request).map(|d| d.path.clone());

    println!("Available cameras:");
    println!();
    for (index, (camera, formats)) in cameras.iter().enumerate() {
        let marker = if selected.as_deref() == Some(camera.path.as_str()) {
            "*"
        } else {
            " "
        };
        let facing = camera.location.as_deref().unwrap_or("unknown");
        println!("{} [{}] {} (facing: {})", marker, index, camera.name, facing);

        if !formats.is_empty() {
            println!("      Formats: {}", top_resolutions(formats, 3).join(", "));
            if let Some(format) = select_format(formats, request.ideal_width, request.ideal_height) {
                println!("      Selected: {}", format);
            }
        }
        println!();
    }

    Ok(())
}

/// Distinct resolutions, largest first, with their best framerate
fn top_resolutions(formats: &[CameraFormat], count: usize) -> Vec<String> {
    let mut resolutions: Vec<(u32, u32, u32)> = Vec::new();
    for format in formats {
        let fps = format.framerate.map(|f| f.as_int()).unwrap_or(30);
        match resolutions
            .iter_mut()
            .find(|(w, h, _)| *w == format.width && *h == format.height)
        {
            Some(existing) => existing.2 = existing.2.max(fps),
            None => resolutions.push((format.width, format.height, fps)),
        }
    }

    resolutions.sort_by(|a, b| (b.0 * b.1).cmp(&(a.0 * a.1)));
    resolutions
        .iter()
        .take(count)
        .map(|(w, h, fps)| format!("{}x{}@{}fps", w, h, fps))
        .collect()
}

#[derive(Serialize)]
struct LocateOutput<'a> {
    #[serde(flatten)]
    fix: &'a LocationFix,
    map_link: String,
}

/// Acquire one location fix and print it
pub fn locate(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let mut session = Session::new();
    let mut presenter = if json {
        ConsolePresenter::quiet()
    } else {
        ConsolePresenter::new()
    };

    runtime.block_on(async {
        let provider = GeoClueProvider::connect(config.location.desktop_id.clone()).await;
        let mut controller = LocationController::new(
            Arc::new(provider),
            config.location.position_options(),
            config.export.map_base_url.clone(),
        );
        controller.request_location(&mut session, &mut presenter).await;
    });

    let Some(fix) = session.location() else {
        return Err("no location fix acquired".into());
    };

    if json {
        let output = LocateOutput {
            fix,
            map_link: fix.map_link(&config.export.map_base_url),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

/// Run the capture flow without the interface and export the report
///
/// A failed step is reported and the remaining steps still run.
pub fn snapshot(
    config: &Config,
    with_photo: bool,
    with_location: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let saver = DirectorySaver::new(output.unwrap_or_else(|| config.export.directory()));
    let export = ExportController::from_config(&config.export);
    let mut presenter = ConsolePresenter::new();
    let mut session = Session::new();

    runtime.block_on(async {
        // The location request runs while the camera warms up
        let mut locator = None;
        let mut location_task = None;
        if with_location {
            let provider = GeoClueProvider::connect(config.location.desktop_id.clone()).await;
            let mut controller = LocationController::new(
                Arc::new(provider),
                config.location.position_options(),
                config.export.map_base_url.clone(),
            );
            location_task = controller.begin_request(&mut presenter).map(tokio::spawn);
            locator = Some(controller);
        }

        if with_photo {
            let mut capture = CaptureController::new(
                Arc::new(PipeWireDevice::new()),
                StreamRequest::from(&config.camera),
            );
            capture.start_camera(&mut presenter).await;
            if capture.is_active() {
                println!("Capturing...");
                wait_for_frames(&mut capture, Duration::from_millis(config.camera.warmup_ms)).await;
                capture.capture_photo(&mut session, &mut presenter);
            }
        }

        if let (Some(controller), Some(task)) = (locator.as_mut(), location_task) {
            let result = task
                .await
                .unwrap_or_else(|e| Err(PositionError::Other(e.to_string())));
            controller.complete_request(result, &mut session, &mut presenter);
        }
    });

    summary::refresh(&session, &mut presenter);
    println!();
    for line in presenter.summary_lines() {
        println!("{}", line);
    }
    println!();

    if session.photo().is_some() {
        export.save_photo(&session, &saver, &mut presenter);
    }
    let name = export.export_data(&session, &saver);
    presenter.show_notice(&format!(
        "Report {} exported to {}",
        name,
        saver.directory().display()
    ));

    Ok(())
}

/// Let the stream run for `warmup`, bounded by the first-frame timeout
async fn wait_for_frames(capture: &mut CaptureController, warmup: Duration) {
    let start = Instant::now();
    let timeout = Duration::from_millis(camera::FIRST_FRAME_TIMEOUT_MS);

    while start.elapsed() < timeout {
        let has_frame = capture.poll_preview().is_some();
        if has_frame && start.elapsed() >= warmup {
            return;
        }
        tokio::time::sleep(UI_TICK).await;
    }
}
