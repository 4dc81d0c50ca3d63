// SPDX-License-Identifier: GPL-3.0-only

//! Scanner screen layout

use crate::app::alert::AlertDialog;
use crate::app::camera_preview::CameraPreview;
use crate::app::state::AppModel;
use crate::constants::{APP_NAME, text};
use crate::scanner::{ScannerPhase, ScannerSnapshot};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

/// Draw the whole screen from the model
pub fn draw(frame: &mut Frame, model: &AppModel) {
    let snapshot = model.snapshot();

    let [title_area, preview_area, result_area, controls_area, status_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    frame.render_widget(Line::from(APP_NAME).bold().centered(), title_area);

    let latest = snapshot.session.as_ref().and_then(|s| s.latest_frame());
    frame.render_widget(
        CameraPreview::new(latest.as_deref(), snapshot.is_active())
            .mirrored(model.mirror_preview()),
        preview_area,
    );

    frame.render_widget(ResultPanel::new(&snapshot), result_area);
    frame.render_widget(controls_line(snapshot.is_active()), controls_area);

    let status = model
        .status()
        .map(str::to_string)
        .unwrap_or_else(|| phase_status(&snapshot));
    frame.render_widget(StatusBar { message: &status }, status_area);

    if let Some(alert) = model.alert() {
        frame.render_widget(AlertDialog::new(alert), frame.area());
    }
}

fn phase_status(snapshot: &ScannerSnapshot) -> String {
    match (snapshot.phase, &snapshot.session) {
        (ScannerPhase::Scanning, Some(session)) => {
            format!("Scanning with {}", session.device_name())
        }
        (ScannerPhase::RequestingPermission, _) => "Requesting camera access...".to_string(),
        (ScannerPhase::Denied, _) => "Camera access denied".to_string(),
        _ => "Paused".to_string(),
    }
}

fn controls_line(scanning: bool) -> Line<'static> {
    let toggle = if scanning { "Pause" } else { "Start Scan" };
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled("[space] ", key),
        Span::raw(toggle),
        Span::raw("   "),
        Span::styled("[r] ", key),
        Span::raw("Reset"),
        Span::raw("   "),
        Span::styled("[q] ", key),
        Span::raw("Quit"),
    ])
    .centered()
}

/// Last decoded value, hidden until something was scanned
struct ResultPanel<'a> {
    snapshot: &'a ScannerSnapshot,
}

impl<'a> ResultPanel<'a> {
    fn new(snapshot: &'a ScannerSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Widget for ResultPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(value) = self.snapshot.last_detected() else {
            return;
        };

        let block = Block::new().style(Style::default().bg(Color::Rgb(40, 40, 40)));
        Paragraph::new(vec![
            Line::from(text::SCANNED_VALUE_LABEL).bold(),
            Line::from(value.to_string()).fg(Color::Cyan),
        ])
        .block(block)
        .wrap(Wrap { trim: false })
        .render(area, buf);
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        buf.set_style(area, style);
        buf.set_stringn(area.x, area.y, self.message, area.width as usize, style);
    }
}
