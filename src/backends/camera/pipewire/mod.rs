// SPDX-License-Identifier: MPL-2.0

//! PipeWire camera backend
//!
//! This backend uses PipeWire for camera enumeration, format detection, and capture.

mod enumeration;
mod pipeline;

pub use enumeration::{
    enumerate_pipewire_cameras, fallback_formats, get_pipewire_formats, is_pipewire_available,
    parse_enum_formats, parse_pw_cli_nodes,
};
pub use pipeline::{PipeWirePipeline, pipeline_description};

use super::types::*;
use super::{CaptureSource, select_scan_format};
use crate::constants::preview;
use tracing::{debug, info};

/// Capture source streaming RGBA frames from a PipeWire camera
pub struct PipeWireCapture {
    /// Preferred device path; `None` picks the first enumerated camera
    preferred_path: Option<String>,
    /// Device resolved on the last start
    current_device: Option<CameraDevice>,
    pipeline: Option<PipeWirePipeline>,
}

impl PipeWireCapture {
    pub fn new(preferred_path: Option<String>) -> Self {
        Self {
            preferred_path,
            current_device: None,
            pipeline: None,
        }
    }

    /// Capture from a specific, already enumerated device
    pub fn with_device(device: CameraDevice) -> Self {
        Self {
            preferred_path: Some(device.path.clone()),
            current_device: Some(device),
            pipeline: None,
        }
    }

    /// The device used by the last successful start
    pub fn current_device(&self) -> Option<&CameraDevice> {
        self.current_device.as_ref()
    }

    fn resolve_device(&self) -> BackendResult<CameraDevice> {
        if let Some(device) = &self.current_device {
            return Ok(device.clone());
        }

        let cameras = enumerate_pipewire_cameras()
            .ok_or_else(|| BackendError::NotAvailable("PipeWire is not available".to_string()))?;

        let preferred = self
            .preferred_path
            .as_deref()
            .and_then(|path| cameras.iter().find(|c| c.path == path));

        preferred
            .or_else(|| cameras.first())
            .cloned()
            .ok_or_else(|| BackendError::DeviceNotFound("No cameras found".to_string()))
    }
}

impl CaptureSource for PipeWireCapture {
    fn start(&mut self, frames: FrameSender) -> BackendResult<()> {
        if self.pipeline.is_some() {
            debug!("PipeWire capture already running");
            return Ok(());
        }

        let device = self.resolve_device()?;
        let format = select_scan_format(
            &get_pipewire_formats(&device),
            preview::TARGET_WIDTH * preview::TARGET_HEIGHT,
        );
        info!(device = %device.name, format = ?format.as_ref().map(|f| f.to_string()), "Starting PipeWire capture");

        let pipeline = PipeWirePipeline::new(&device, format.as_ref(), frames)?;
        self.pipeline = Some(pipeline);
        self.current_device = Some(device);
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        match self.pipeline.take() {
            Some(pipeline) => pipeline.stop(),
            None => Ok(()),
        }
    }

    fn is_running(&self) -> bool {
        self.pipeline.is_some()
    }

    fn device_name(&self) -> String {
        self.current_device
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "PipeWire camera".to_string())
    }
}
