// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire GStreamer pipeline for camera capture
//!
//! `pipewiresrc` feeds a decode/convert chain that always ends in tightly
//! described RGBA frames on an appsink. Frames are copied out of the GStreamer
//! buffer and pushed through a bounded channel; when the consumer falls behind
//! frames are dropped rather than queued.

use super::super::types::*;
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Running camera pipeline; stops and releases the device on drop
pub struct PipeWirePipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl PipeWirePipeline {
    /// Build, start and wire up a pipeline for `device` in `format`
    ///
    /// With no format the source negotiates whatever the device prefers.
    pub fn new(
        device: &CameraDevice,
        format: Option<&CameraFormat>,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        info!(
            device = %device.name,
            format = ?format.map(|f| f.to_string()),
            "Creating PipeWire pipeline"
        );

        gstreamer::init().map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        gstreamer::ElementFactory::find("pipewiresrc").ok_or_else(|| {
            BackendError::NotAvailable("pipewiresrc not available: factory not found".to_string())
        })?;

        let target = determine_pipewire_path(&device.path);
        let description = build_pipeline_string(&target, format);
        info!(pipeline = %description, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| BackendError::InitializationFailed("Failed to cast to pipeline".to_string()))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| BackendError::InitializationFailed("Failed to cast appsink".to_string()))?;

        appsink.set_property("emit-signals", true);
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_start = Instant::now();
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                    let sample = appsink.pull_sample().map_err(|e| {
                        if frame_num % 30 == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to pull sample");
                        }
                        gstreamer::FlowError::Eos
                    })?;

                    let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
                    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                        if frame_num % 30 == 0 {
                            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                        }
                        return Ok(gstreamer::FlowSuccess::Ok);
                    }

                    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                    let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                        if frame_num % 30 == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to get video info");
                        }
                        gstreamer::FlowError::Error
                    })?;

                    let map = buffer.map_readable().map_err(|_| gstreamer::FlowError::Error)?;

                    let frame = CameraFrame {
                        width: video_info.width(),
                        height: video_info.height(),
                        data: FrameData::from(map.as_slice()),
                        stride: video_info.stride()[0] as u32,
                        captured_at: frame_start,
                    };

                    let mut sender = frame_sender.clone();
                    match sender.try_send(frame) {
                        Ok(()) => {
                            if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                                debug!(
                                    frame = frame_num,
                                    width = video_info.width(),
                                    height = video_info.height(),
                                    copy_us = frame_start.elapsed().as_micros(),
                                    "Frame delivered"
                                );
                            }
                        }
                        Err(e) if e.is_disconnected() => {
                            debug!("Frame receiver gone, ending stream");
                            return Err(gstreamer::FlowError::Eos);
                        }
                        Err(_) => {
                            if frame_num % 30 == 0 {
                                debug!(frame = frame_num, "Frame dropped (channel full)");
                            }
                        }
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        start_playing(&pipeline)?;

        info!("PipeWire camera initialization complete");
        Ok(Self { pipeline, appsink })
    }
}

impl Drop for PipeWirePipeline {
    fn drop(&mut self) {
        info!("Stopping PipeWire pipeline");
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to stop pipeline");
            return;
        }
        let (result, state, _) = self
            .pipeline
            .state(gstreamer::ClockTime::from_seconds(timing::STOP_TIMEOUT_SECS));
        debug!(?result, ?state, "Pipeline stopped");
    }
}

/// Set the pipeline to PLAYING, turning a refusal into an error carrying the bus message
fn start_playing(pipeline: &gstreamer::Pipeline) -> BackendResult<()> {
    let failure = match pipeline.set_state(gstreamer::State::Playing) {
        Ok(_) => {
            let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
                timing::START_TIMEOUT_SECS,
            ));
            debug!(?result, ?state, ?pending, "Pipeline state");

            if result.is_ok() && state == gstreamer::State::Playing {
                return Ok(());
            }
            if matches!(result, Ok(gstreamer::StateChangeSuccess::Async))
                && pending == gstreamer::State::Playing
            {
                // Frames arrive once the device is ready
                info!("Pipeline transitioning asynchronously");
                return Ok(());
            }
            format!("Pipeline failed to start (state: {:?}, result: {:?})", state, result)
        }
        Err(e) => format!("Failed to set pipeline to PLAYING: {}", e),
    };

    let reason = pop_bus_error(pipeline).unwrap_or(failure);
    error!(reason = %reason, "Pipeline failed to reach PLAYING");
    let _ = pipeline.set_state(gstreamer::State::Null);
    let _ = pipeline.state(gstreamer::ClockTime::from_seconds(timing::STOP_TIMEOUT_SECS));
    Err(BackendError::InitializationFailed(reason))
}

/// First error posted on the bus, if any
fn pop_bus_error(pipeline: &gstreamer::Pipeline) -> Option<String> {
    let bus = pipeline.bus()?;
    let msg = bus.timed_pop_filtered(
        gstreamer::ClockTime::from_mseconds(100),
        &[gstreamer::MessageType::Error],
    )?;
    match msg.view() {
        gstreamer::MessageView::Error(err) => {
            warn!(
                error = %err.error(),
                debug = ?err.debug(),
                source = ?err.src().map(|s| s.name()),
                "GStreamer error during pipeline start"
            );
            Some(err.error().to_string())
        }
        _ => None,
    }
}

/// Map a device path to the `pipewiresrc` target property (with trailing space)
pub(crate) fn determine_pipewire_path(device_path: &str) -> String {
    if device_path.is_empty() {
        debug!("Using default PipeWire camera (auto-select)");
        String::new()
    } else if let Some(serial) = device_path.strip_prefix("pipewire-serial-") {
        format!("target-object={} ", serial)
    } else if let Some(node_id) = device_path.strip_prefix("pipewire-") {
        format!("target-object={} ", node_id)
    } else if device_path.starts_with("/dev/video") {
        format!("path=v4l2:{} ", device_path)
    } else {
        warn!(device_path, "Unknown device path format, using path property");
        format!("path={} ", device_path)
    }
}

/// Full `gst-launch` description ending in an RGBA appsink named `sink`
pub(crate) fn build_pipeline_string(target: &str, format: Option<&CameraFormat>) -> String {
    let source_caps = match format {
        Some(f) => {
            let mut size = format!("width=(int){},height=(int){}", f.width, f.height);
            if let Some(fps) = f.framerate {
                size.push_str(&format!(",framerate=(fraction){}/{}", fps.num, fps.denom));
            }
            match f.pixel_format.to_uppercase().as_str() {
                "MJPG" | "MJPEG" | "JPEG" => format!("image/jpeg,{} ! ", size),
                _ => format!("video/x-raw,{} ! ", size),
            }
        }
        None => String::new(),
    };

    format!(
        "pipewiresrc {}do-timestamp=true ! {}decodebin ! videoconvert ! \
         video/x-raw,format=RGBA ! \
         queue max-size-buffers={} leaky=downstream ! \
         appsink name=sink",
        target,
        source_caps,
        pipeline::MAX_BUFFERS
    )
}
