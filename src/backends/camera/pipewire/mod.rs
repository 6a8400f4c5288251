// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera backend
//!
//! Enumerates cameras with `pw-cli`, picks a device and format for the
//! request, and runs a GStreamer `pipewiresrc` pipeline that delivers RGBA
//! frames. Opening blocks on GStreamer state changes, so it runs on the
//! blocking thread pool.

mod enumeration;
mod pipeline;

pub use enumeration::{enumerate_pipewire_cameras, get_pipewire_formats, is_pipewire_available};
pub use pipeline::PipeWirePipeline;

use super::types::*;
use super::{LiveStream, MediaDevice, StreamFuture, StreamRequest, select_device, select_format};
use crate::constants::pipeline as pipeline_consts;
use crate::errors::CameraError;
use futures::FutureExt;
use tracing::{debug, info, warn};

/// Camera access through PipeWire
#[derive(Debug, Default, Clone)]
pub struct PipeWireDevice;

impl PipeWireDevice {
    pub fn new() -> Self {
        Self
    }

    /// Every camera with its offered formats
    pub fn list(&self) -> Result<Vec<(CameraDevice, Vec<CameraFormat>)>, CameraError> {
        let cameras = enumerate_pipewire_cameras().ok_or(CameraError::NoCameraFound)?;
        Ok(cameras
            .into_iter()
            .map(|camera| {
                let formats = get_pipewire_formats(&camera);
                (camera, formats)
            })
            .collect())
    }

    fn open_blocking(request: StreamRequest) -> Result<Box<dyn LiveStream>, CameraError> {
        gstreamer::init().map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

        let cameras = enumerate_pipewire_cameras().ok_or(CameraError::NoCameraFound)?;
        let device = select_device(&cameras, &request)
            .cloned()
            .ok_or(CameraError::NoCameraFound)?;

        let formats = get_pipewire_formats(&device);
        let format = select_format(&formats, request.ideal_width, request.ideal_height);
        match &format {
            Some(f) => info!(device = %device.name, format = %f, "Selected camera format"),
            None => warn!(device = %device.name, "No formats enumerated, letting PipeWire negotiate"),
        }

        let (sender, receiver) =
            futures::channel::mpsc::channel(pipeline_consts::FRAME_CHANNEL_CAPACITY);
        let pipeline = PipeWirePipeline::new(&device, format.as_ref(), sender)?;

        Ok(Box::new(PipeWireStream {
            _pipeline: pipeline,
            receiver,
            latest: None,
            label: device.name,
        }))
    }
}

impl MediaDevice for PipeWireDevice {
    fn open(&self, request: &StreamRequest) -> StreamFuture {
        let request = request.clone();
        debug!(?request, "Opening camera stream");
        async move {
            tokio::task::spawn_blocking(move || Self::open_blocking(request))
                .await
                .map_err(|e| CameraError::Other(format!("Camera task failed: {}", e)))?
        }
        .boxed()
    }
}

/// Live PipeWire stream; dropping it stops the pipeline
pub struct PipeWireStream {
    _pipeline: PipeWirePipeline,
    receiver: FrameReceiver,
    latest: Option<CameraFrame>,
    label: String,
}

impl LiveStream for PipeWireStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn refresh(&mut self) {
        while let Ok(frame) = self.receiver.try_recv() {
            self.latest = Some(frame);
        }
    }

    fn current_frame(&self) -> Option<&CameraFrame> {
        self.latest.as_ref()
    }
}
