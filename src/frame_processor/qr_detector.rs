// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Frames are reduced to 8-bit luma (downscaled when large) and handed to
//! `rqrr` for grid detection and decoding.

use super::types::{FrameRegion, QrDetection};
use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::constants::detection;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// QR code detector
///
/// Optimized for real-time processing with frame downscaling.
#[derive(Debug, Clone, Copy)]
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    pub fn new() -> Self {
        Self::with_max_dimension(detection::DEFAULT_MAX_DIMENSION)
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Detect QR codes in a camera frame on the blocking pool
    pub async fn detect(&self, frame: Arc<CameraFrame>) -> Vec<QrDetection> {
        let detector = *self;
        tokio::task::spawn_blocking(move || detector.detect_sync(&frame))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR detection task panicked");
                Vec::new()
            })
    }

    /// Detect QR codes in a still image
    pub fn detect_image(&self, image: &image::DynamicImage) -> Vec<QrDetection> {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        let frame = CameraFrame::from_gray(width, height, gray.into_raw());
        self.detect_sync(&frame)
    }

    /// Synchronous detection
    pub fn detect_sync(&self, frame: &CameraFrame) -> Vec<QrDetection> {
        if frame.width == 0 || frame.height == 0 {
            return Vec::new();
        }

        let start = std::time::Instant::now();
        let (luma, proc_width, proc_height, scale) = prepare_luma(frame, self.max_dimension);
        trace!(
            proc_width,
            proc_height,
            scale,
            conversion_ms = start.elapsed().as_millis(),
            "Prepared luma image for processing"
        );

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            proc_width as usize,
            proc_height as usize,
            |x, y| luma[y * proc_width as usize + x],
        );
        let grids = prepared.detect_grids();

        let mut detections = Vec::with_capacity(grids.len());
        for grid in grids {
            let content = match grid.decode() {
                Ok((_meta, content)) => content,
                Err(e) => {
                    debug!(error = %e, "Failed to decode QR code");
                    continue;
                }
            };

            // Scale corner points back to original frame coordinates
            let corners: Vec<(f32, f32)> = grid
                .bounds
                .iter()
                .map(|p| (p.x as f32 * scale, p.y as f32 * scale))
                .collect();
            let region = FrameRegion::bounding(&corners, frame.width, frame.height);

            debug!(content = %content, x = region.x, y = region.y, "Detected QR code");
            detections.push(QrDetection::new(region, content));
        }

        if !detections.is_empty() {
            debug!(
                count = detections.len(),
                total_ms = start.elapsed().as_millis(),
                "QR detection found codes"
            );
        }

        detections
    }
}

/// Produce a tightly packed luma buffer no larger than `max_dimension` on either side.
///
/// Returns `(luma, width, height, scale)` where `scale` maps processed
/// coordinates back to frame coordinates.
fn prepare_luma(frame: &CameraFrame, max_dimension: u32) -> (Vec<u8>, u32, u32, f32) {
    let (width, height) = (frame.width, frame.height);

    if width <= max_dimension && height <= max_dimension {
        let mut luma = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                luma.push(luma_at(frame, x, y));
            }
        }
        return (luma, width, height, 1.0);
    }

    let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
    let dst_width = ((width as f32 / scale) as u32).max(1);
    let dst_height = ((height as f32 / scale) as u32).max(1);
    let x_ratio = width as f32 / dst_width as f32;
    let y_ratio = height as f32 / dst_height as f32;

    let mut luma = Vec::with_capacity((dst_width * dst_height) as usize);
    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = src_x as u32;
            let y0 = src_y as u32;
            let x1 = (x0 + 1).min(width - 1);
            let y1 = (y0 + 1).min(height - 1);
            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let p00 = luma_at(frame, x0, y0) as f32;
            let p01 = luma_at(frame, x1, y0) as f32;
            let p10 = luma_at(frame, x0, y1) as f32;
            let p11 = luma_at(frame, x1, y1) as f32;

            let value = p00 * (1.0 - x_frac) * (1.0 - y_frac)
                + p01 * x_frac * (1.0 - y_frac)
                + p10 * (1.0 - x_frac) * y_frac
                + p11 * x_frac * y_frac;
            luma.push(value as u8);
        }
    }

    (luma, dst_width, dst_height, scale)
}

/// 8-bit luma of the pixel at `(x, y)`, BT.601 weights for RGB formats
pub fn luma_at(frame: &CameraFrame, x: u32, y: u32) -> u8 {
    let data = frame.data_slice();
    let row = y as usize * frame.stride as usize;

    let rgb_luma = |idx: usize| -> u8 {
        match data.get(idx..idx + 3) {
            Some(px) => {
                ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8
            }
            None => 0,
        }
    };

    match frame.format {
        PixelFormat::RGBA => rgb_luma(row + x as usize * 4),
        PixelFormat::Gray8 => data.get(row + x as usize).copied().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_from_rgba_with_stride() {
        let data: Vec<u8> = vec![
            255, 255, 255, 255, // white
            0, 0, 0, 255, // black
            0, 0, // stride padding
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, // stride padding
        ];
        let mut frame = CameraFrame::from_rgba(2, 2, data);
        frame.stride = 10;

        assert_eq!(luma_at(&frame, 0, 0), 255);
        assert_eq!(luma_at(&frame, 1, 0), 0);
        assert_eq!(luma_at(&frame, 0, 1), 76);
        assert_eq!(luma_at(&frame, 1, 1), 149);
    }

    #[test]
    fn test_luma_from_gray_with_stride() {
        let mut frame = CameraFrame::from_gray(2, 2, vec![10, 20, 0, 30, 40, 0]);
        frame.stride = 3;
        assert_eq!(luma_at(&frame, 1, 0), 20);
        assert_eq!(luma_at(&frame, 0, 1), 30);
        assert_eq!(luma_at(&frame, 2, 5), 0);
    }

    #[test]
    fn test_prepare_luma_downscales_large_frames() {
        let frame = CameraFrame::from_gray(1280, 720, vec![200; 1280 * 720]);
        let (luma, width, height, scale) = prepare_luma(&frame, 640);
        assert_eq!((width, height), (640, 360));
        assert_eq!(scale, 2.0);
        assert_eq!(luma.len(), 640 * 360);
        assert!(luma.iter().all(|&v| v == 200));
    }

    #[test]
    fn test_prepare_luma_keeps_small_frames() {
        let frame = CameraFrame::from_gray(4, 2, (0..8).collect());
        let (luma, width, height, scale) = prepare_luma(&frame, 640);
        assert_eq!((width, height, scale), (4, 2, 1.0));
        assert_eq!(luma, (0..8).collect::<Vec<u8>>());
    }

    #[test]
    fn test_blank_frame_has_no_codes() {
        let frame = CameraFrame::from_rgba(64, 64, vec![255; 64 * 64 * 4]);
        assert!(QrDetector::new().detect_sync(&frame).is_empty());
    }

    #[test]
    fn test_empty_frame_has_no_codes() {
        let frame = CameraFrame::from_gray(0, 0, Vec::new());
        assert!(QrDetector::new().detect_sync(&frame).is_empty());
    }

    #[tokio::test]
    async fn test_async_detect_on_blank_frame() {
        let frame = Arc::new(CameraFrame::from_gray(32, 32, vec![0; 32 * 32]));
        assert!(QrDetector::new().detect(frame).await.is_empty());
    }
}
