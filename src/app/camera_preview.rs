// SPDX-License-Identifier: GPL-3.0-only

//! Live preview widget
//!
//! Renders camera frames using Unicode half-block characters so every
//! terminal cell shows two vertical pixels.

use crate::backends::camera::{CameraFrame, PixelFormat};
use crate::constants::text;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Preview area of the scanner screen
pub struct CameraPreview<'a> {
    frame: Option<&'a CameraFrame>,
    active: bool,
    mirror: bool,
}

impl<'a> CameraPreview<'a> {
    /// `active` tells whether a session is running; with no session the
    /// placeholder is shown even if a stale frame is passed in.
    pub fn new(frame: Option<&'a CameraFrame>, active: bool) -> Self {
        Self {
            frame,
            active,
            mirror: false,
        }
    }

    pub fn mirrored(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }
}

impl Widget for CameraPreview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let frame = match (self.active, self.frame) {
            (true, Some(frame)) if frame.width > 0 && frame.height > 0 => frame,
            (true, _) => {
                render_placeholder(area, buf, text::WAITING_FOR_CAMERA);
                return;
            }
            (false, _) => {
                render_placeholder(area, buf, text::PREVIEW_PLACEHOLDER);
                return;
            }
        };

        // Each terminal cell displays 2 vertical pixels
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height as f64) * 2.0;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let w = term_height * frame_aspect;
            (w as u16, area.height)
        } else {
            let h = term_width / frame_aspect;
            (area.width, (h / 2.0) as u16)
        };
        let display_width = display_width.max(1);
        let display_height = display_height.max(1);

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height as f64 * 2.0);

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;
                if term_x >= area.right() || term_y >= area.bottom() {
                    continue;
                }

                let column = if self.mirror {
                    display_width - 1 - tx
                } else {
                    tx
                };
                let src_x = (column as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, src_x, src_y_top));
                    cell.set_bg(sample_pixel(frame, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn render_placeholder(area: Rect, buf: &mut Buffer, message: &str) {
    let background = Style::default().bg(Color::Rgb(40, 40, 40)).fg(Color::Gray);
    buf.set_style(area, background);

    let width = message.chars().count().min(area.width as usize) as u16;
    let x = area.x + (area.width - width) / 2;
    let y = area.y + area.height / 2;
    buf.set_stringn(x, y, message, area.width as usize, background);
}

fn sample_pixel(frame: &CameraFrame, x: u32, y: u32) -> Color {
    let (r, g, b) = sample_pixel_rgb(frame, x, y);
    Color::Rgb(r, g, b)
}

/// Sample one pixel as RGB, clamping coordinates to the frame
fn sample_pixel_rgb(frame: &CameraFrame, x: u32, y: u32) -> (u8, u8, u8) {
    let x = x.min(frame.width.saturating_sub(1));
    let y = y.min(frame.height.saturating_sub(1));
    let data = frame.data_slice();

    match frame.format {
        PixelFormat::RGBA => {
            let idx = y as usize * frame.stride as usize + x as usize * 4;
            match data.get(idx..idx + 3) {
                Some(px) => (px[0], px[1], px[2]),
                None => (0, 0, 0),
            }
        }
        PixelFormat::Gray8 => {
            let idx = y as usize * frame.stride as usize + x as usize;
            data.get(idx).map_or((0, 0, 0), |&v| (v, v, v))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_placeholder_when_idle() {
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        CameraPreview::new(None, false).render(area, &mut buf);
        assert!(buffer_text(&buf).contains(text::PREVIEW_PLACEHOLDER));
    }

    #[test]
    fn test_waiting_when_active_without_frame() {
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        CameraPreview::new(None, true).render(area, &mut buf);
        assert!(buffer_text(&buf).contains(text::WAITING_FOR_CAMERA));
    }

    #[test]
    fn test_stale_frame_hidden_when_idle() {
        let frame = CameraFrame::from_rgba(2, 2, vec![255; 16]);
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        CameraPreview::new(Some(&frame), false).render(area, &mut buf);
        assert!(buffer_text(&buf).contains(text::PREVIEW_PLACEHOLDER));
    }

    #[test]
    fn test_mirrored_render() {
        // Left column red, right column blue
        let data = vec![
            255, 0, 0, 255, 0, 0, 255, 255, //
            255, 0, 0, 255, 0, 0, 255, 255,
        ];
        let frame = CameraFrame::from_rgba(2, 2, data);
        let area = Rect::new(0, 0, 2, 1);

        let mut buf = Buffer::empty(area);
        CameraPreview::new(Some(&frame), true).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 0, 0));

        let mut buf = Buffer::empty(area);
        CameraPreview::new(Some(&frame), true)
            .mirrored(true)
            .render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_sample_gray() {
        let frame = CameraFrame::from_gray(2, 1, vec![10, 200]);
        assert_eq!(sample_pixel_rgb(&frame, 1, 0), (200, 200, 200));
        // Out of range coordinates clamp
        assert_eq!(sample_pixel_rgb(&frame, 9, 9), (200, 200, 200));
    }

    #[test]
    fn test_sample_empty_frame() {
        let frame = CameraFrame::from_rgba(0, 0, Vec::new());
        assert_eq!(sample_pixel_rgb(&frame, 0, 0), (0, 0, 0));
        assert_eq!(sample_pixel_rgb(&frame, 3, 7), (0, 0, 0));
    }

    #[test]
    fn test_render_zero_sized_frame() {
        let frame = CameraFrame::from_gray(0, 0, Vec::new());
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        CameraPreview::new(Some(&frame), true).render(area, &mut buf);
        assert!(buffer_text(&buf).contains(text::WAITING_FOR_CAMERA));
    }
}
