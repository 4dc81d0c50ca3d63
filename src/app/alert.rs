// SPDX-License-Identifier: GPL-3.0-only

//! Permission-denied modal

use crate::app::state::{AlertButton, PermissionAlert};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Widget, Wrap},
};

const MAX_WIDTH: u16 = 60;
const HEIGHT: u16 = 9;

/// Centered dialog with "Open Settings" and "Cancel" buttons
pub struct AlertDialog<'a> {
    alert: &'a PermissionAlert,
}

impl<'a> AlertDialog<'a> {
    pub fn new(alert: &'a PermissionAlert) -> Self {
        Self { alert }
    }
}

/// Rectangle of the dialog inside `area`
pub fn dialog_area(area: Rect) -> Rect {
    let width = MAX_WIDTH.min(area.width.saturating_sub(4)).max(area.width.min(20));
    let height = HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn button(label: &str, focused: bool) -> Span<'_> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    };
    Span::styled(format!(" {} ", label), style)
}

impl Widget for AlertDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = dialog_area(area);
        Clear.render(area, buf);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Line::from(self.alert.title).bold().centered());
        let inner = block.inner(area);
        block.render(area, buf);

        let [message_area, buttons_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        Paragraph::new(self.alert.message.as_str())
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .render(message_area, buf);

        let focused = self.alert.focused;
        Line::from(vec![
            button(
                AlertButton::OpenSettings.label(),
                focused == AlertButton::OpenSettings,
            ),
            Span::raw("   "),
            button(AlertButton::Cancel.label(), focused == AlertButton::Cancel),
        ])
        .centered()
        .render(buttons_area, buf);
    }
}
