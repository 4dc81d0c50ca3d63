// SPDX-License-Identifier: MPL-2.0

//! PipeWire GStreamer pipeline for camera capture

use super::super::types::*;
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// PipeWire camera pipeline
///
/// `pipewiresrc` → `decodebin` → `videoconvert` → RGBA `appsink`. Frames are
/// pushed into the sender from the GStreamer streaming thread.
pub struct PipeWirePipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl PipeWirePipeline {
    /// Build and start a pipeline for `device`
    pub fn new(
        device: &CameraDevice,
        format: Option<&CameraFormat>,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        gstreamer::init().map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        gstreamer::ElementFactory::find("pipewiresrc").ok_or_else(|| {
            BackendError::NotAvailable("pipewiresrc not available: factory not found".to_string())
        })?;

        let description = pipeline_description(device, format);
        info!(device = %device.name, pipeline = %description, "Creating PipeWire pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                BackendError::InitializationFailed("Launch result is not a pipeline".to_string())
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast appsink".to_string())
            })?;

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
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to pull sample");
                        }
                        gstreamer::FlowError::Eos
                    })?;

                    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                    let video_info =
                        VideoInfo::from_caps(caps).map_err(|_| gstreamer::FlowError::Error)?;

                    let buffer = sample.buffer_owned().ok_or(gstreamer::FlowError::Error)?;
                    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                        }
                        return Ok(gstreamer::FlowSuccess::Ok);
                    }

                    let mapped = buffer
                        .into_mapped_buffer_readable()
                        .map_err(|_| gstreamer::FlowError::Error)?;

                    let frame = CameraFrame {
                        width: video_info.width(),
                        height: video_info.height(),
                        data: FrameData::from_mapped_buffer(mapped),
                        format: PixelFormat::RGBA,
                        stride: video_info.stride()[0] as u32,
                        captured_at: frame_start,
                    };

                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame) {
                        if e.is_disconnected() {
                            return Err(gstreamer::FlowError::Eos);
                        }
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(frame = frame_num, "Frame dropped (channel full)");
                        }
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if let Err(e) = result {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(format!(
                "Pipeline failed to reach PLAYING: {}",
                e
            )));
        }

        Ok(Self { pipeline, appsink })
    }

    /// Stop the pipeline and release the camera
    pub fn stop(self) -> BackendResult<()> {
        info!("Stopping PipeWire pipeline");
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        self.pipeline
            .set_state(gstreamer::State::Null)
            .map_err(|e| BackendError::Other(format!("Failed to stop pipeline: {}", e)))?;

        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        if let Err(e) = result {
            debug!(error = ?e, state = ?state, "Pipeline state change had issues");
        }
        Ok(())
    }
}

impl Drop for PipeWirePipeline {
    fn drop(&mut self) {
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

/// Map a device path to the `pipewiresrc` property selecting it
fn pipewire_target(device_path: &str) -> String {
    if device_path.is_empty() {
        String::new()
    } else if let Some(serial) = device_path.strip_prefix("pipewire-serial-") {
        format!("target-object={} ", serial)
    } else if let Some(id) = device_path.strip_prefix("pipewire-") {
        format!("path={} ", id)
    } else {
        format!("target-object={} ", device_path)
    }
}

/// Build the gst-launch description for a capture pipeline
pub fn pipeline_description(device: &CameraDevice, format: Option<&CameraFormat>) -> String {
    let target = pipewire_target(&device.path);
    let size = format
        .map(|f| format!(",width={},height={}", f.width, f.height))
        .unwrap_or_default();

    format!(
        "pipewiresrc {target}do-timestamp=true ! decodebin ! videoconvert ! videoscale ! \
         video/x-raw,format={fmt}{size} ! appsink name=sink",
        fmt = pipeline::OUTPUT_FORMAT,
    )
}
