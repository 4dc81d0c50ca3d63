// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use gstreamer::buffer::{MappedBuffer, Readable};
use std::sync::Arc;
use std::time::Instant;

/// Frame data storage - either pre-copied bytes or zero-copy GStreamer buffer
///
/// The `Mapped` variant keeps the GStreamer buffer mapped and alive until all
/// references are dropped.
#[derive(Clone)]
pub enum FrameData {
    /// Pre-copied bytes (used for still images, tests, etc.)
    Copied(Arc<[u8]>),
    /// Zero-copy mapped GStreamer buffer
    Mapped(Arc<MappedBuffer<Readable>>),
}

impl FrameData {
    /// Create FrameData from a mapped GStreamer buffer (zero-copy)
    pub fn from_mapped_buffer(buffer: MappedBuffer<Readable>) -> Self {
        FrameData::Mapped(Arc::new(buffer))
    }

    pub fn len(&self) -> usize {
        match self {
            FrameData::Copied(data) => data.len(),
            FrameData::Mapped(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameData::Copied(data) => write!(f, "FrameData::Copied({} bytes)", data.len()),
            FrameData::Mapped(buf) => write!(f, "FrameData::Mapped({} bytes)", buf.len()),
        }
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FrameData::Copied(data) => data.as_ref(),
            FrameData::Mapped(buf) => buf.as_slice(),
        }
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

impl From<Vec<u8>> for FrameData {
    fn from(data: Vec<u8>) -> Self {
        FrameData::Copied(Arc::from(data))
    }
}

/// Device information from the PipeWire node properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Name of the device (node.nick)
    pub card: String,
    /// Device path (e.g., /dev/video0)
    pub path: String,
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Capture target (PipeWire serial or node ID); empty = let PipeWire choose
    pub path: String,
    /// PipeWire node ID used for format enumeration
    pub metadata_path: Option<String>,
    pub device_info: Option<DeviceInfo>,
}

impl CameraDevice {
    /// The device PipeWire picks when no target is given
    pub fn pipewire_default() -> Self {
        Self {
            name: "Default Camera (PipeWire)".to_string(),
            path: String::new(),
            metadata_path: None,
            device_info: None,
        }
    }
}

/// Framerate as a fraction (numerator/denominator)
/// Stores exact framerate to handle NTSC rates like 59.94fps (60000/1001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    pub fn from_int(fps: u32) -> Self {
        Self { num: fps, denom: 1 }
    }

    /// Get the rounded integer framerate
    pub fn as_int(&self) -> u32 {
        self.num / self.denom
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom != 1 {
            write!(f, "{:.2}", self.num as f64 / self.denom as f64)
        } else {
            write!(f, "{}", self.num)
        }
    }
}

/// Camera format specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub framerate: Option<Framerate>,
    /// FourCC code (e.g., "MJPG", "YUY2")
    pub pixel_format: String,
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = &self.framerate {
            write!(f, "{}x{} @ {}fps", self.width, self.height, fps)
        } else {
            write!(f, "{}x{}", self.width, self.height)
        }
    }
}

/// Pixel format for camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel), produced by the capture pipeline
    RGBA,
    /// Gray8 - 8-bit grayscale (single channel), used for still images
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A single frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: FrameData,
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame from owned pixels
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format: PixelFormat::RGBA,
            stride: width * PixelFormat::RGBA.bytes_per_pixel(),
            captured_at: Instant::now(),
        }
    }

    /// Build a tightly packed 8-bit grayscale frame from owned pixels
    pub fn from_gray(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format: PixelFormat::Gray8,
            stride: width * PixelFormat::Gray8.bytes_per_pixel(),
            captured_at: Instant::now(),
        }
    }

    pub fn data_slice(&self) -> &[u8] {
        self.data.as_ref()
    }
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to initialize backend
    InitializationFailed(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framerate_zero_denominator() {
        let fps = Framerate::new(30, 0);
        assert_eq!(fps.as_int(), 30);
        assert_eq!(fps.denom, 1);
    }

    #[test]
    fn test_ntsc_framerate_display() {
        assert_eq!(Framerate::new(60000, 1001).to_string(), "59.94");
        assert_eq!(Framerate::from_int(30).to_string(), "30");
    }

    #[test]
    fn test_format_display() {
        let format = CameraFormat {
            width: 640,
            height: 480,
            framerate: None,
            pixel_format: "YUY2".to_string(),
        };
        assert_eq!(format.to_string(), "640x480");
    }

    #[test]
    fn test_constructors_pack_rows() {
        let rgba = CameraFrame::from_rgba(3, 2, vec![0; 24]);
        assert_eq!(rgba.stride, 3 * PixelFormat::RGBA.bytes_per_pixel());
        let gray = CameraFrame::from_gray(3, 2, vec![0; 6]);
        assert_eq!(gray.stride, 3);
        assert_eq!(gray.data_slice().len(), 6);
    }
}
