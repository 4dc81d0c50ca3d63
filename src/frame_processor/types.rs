// SPDX-License-Identifier: MPL-2.0

//! Core types for frame processing results

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FrameRegion {
    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width.max(1) as f32;
        let fh = frame_height.max(1) as f32;
        Self {
            x: x as f32 / fw,
            y: y as f32 / fh,
            width: width as f32 / fw,
            height: height as f32 / fh,
        }
    }

    /// Bounding box of a set of pixel-space corner points, clamped to the frame
    pub fn bounding(points: &[(f32, f32)], frame_width: u32, frame_height: u32) -> Self {
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if points.is_empty() {
            return Self::from_pixels(0, 0, 0, 0, frame_width, frame_height);
        }

        let min_x = min_x.clamp(0.0, frame_width as f32);
        let max_x = max_x.clamp(0.0, frame_width as f32);
        let min_y = min_y.clamp(0.0, frame_height as f32);
        let max_y = max_y.clamp(0.0, frame_height as f32);

        Self::from_pixels(
            min_x as u32,
            min_y as u32,
            (max_x - min_x) as u32,
            (max_y - min_y) as u32,
            frame_width,
            frame_height,
        )
    }
}

/// A decoded QR code and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct QrDetection {
    pub region: FrameRegion,
    /// Decoded payload
    pub content: String,
}

impl QrDetection {
    pub fn new(region: FrameRegion, content: String) -> Self {
        Self { region, content }
    }
}
