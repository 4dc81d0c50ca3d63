// SPDX-License-Identifier: MPL-2.0

//! Camera capture abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  ScannerController  │  ← start/stop, permission, published state
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CaptureSource Trait │  ← start streaming frames / stop
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← GStreamer pipewiresrc → RGBA appsink
//!       └────────┘
//! ```

pub mod pipewire;
pub mod types;

pub use types::*;

/// A camera that can stream frames on demand
///
/// Implementations deliver frames from their own streaming thread into the
/// provided sender. Frames are dropped when the channel is full.
pub trait CaptureSource: Send {
    /// Start streaming frames into `frames`
    ///
    /// Called only while the source is stopped.
    fn start(&mut self, frames: FrameSender) -> BackendResult<()>;

    /// Stop streaming and release the device. Stopping a stopped source is a no-op.
    fn stop(&mut self) -> BackendResult<()>;

    /// Check whether frames are currently being produced
    fn is_running(&self) -> bool;

    /// Human readable name of the active (or configured) device
    fn device_name(&self) -> String;
}

impl<T: CaptureSource + ?Sized> CaptureSource for Box<T> {
    fn start(&mut self, frames: FrameSender) -> BackendResult<()> {
        (**self).start(frames)
    }

    fn stop(&mut self) -> BackendResult<()> {
        (**self).stop()
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn device_name(&self) -> String {
        (**self).device_name()
    }
}

/// Pick the format closest to `target_pixels`, preferring formats with a known framerate
pub fn select_scan_format(formats: &[CameraFormat], target_pixels: u32) -> Option<CameraFormat> {
    formats
        .iter()
        .min_by_key(|f| {
            let pixels = f.width as i64 * f.height as i64;
            let diff = (pixels - target_pixels as i64).abs();
            let fps_penalty = if f.framerate.is_some() { 0 } else { 1_000_000 };
            diff + fps_penalty
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(width: u32, height: u32, fps: Option<u32>) -> CameraFormat {
        CameraFormat {
            width,
            height,
            framerate: fps.map(Framerate::from_int),
            pixel_format: "MJPG".to_string(),
        }
    }

    #[test]
    fn test_select_scan_format_prefers_vga() {
        let formats = vec![
            format(1920, 1080, Some(30)),
            format(640, 480, Some(30)),
            format(320, 240, Some(30)),
        ];
        let selected = select_scan_format(&formats, 640 * 480).unwrap();
        assert_eq!((selected.width, selected.height), (640, 480));
    }

    #[test]
    fn test_select_scan_format_penalizes_unknown_framerate() {
        let formats = vec![format(640, 480, None), format(800, 600, Some(30))];
        let selected = select_scan_format(&formats, 640 * 480).unwrap();
        assert_eq!(selected.width, 800);
    }

    #[test]
    fn test_select_scan_format_empty() {
        assert!(select_scan_format(&[], 640 * 480).is_none());
    }
}
