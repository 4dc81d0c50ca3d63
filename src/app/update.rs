// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling and key bindings

use crate::app::state::{AlertButton, AppModel, Message};
use crate::scanner::ScannerPhase;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;
use tracing::{error, info};

impl AppModel {
    /// Apply a message. Returns the spawned task when the message starts async work.
    pub fn update(&mut self, message: Message) -> Option<JoinHandle<()>> {
        match message {
            Message::ToggleScanning => self.handle_toggle_scanning(),
            Message::Reset => self.handle_reset(),
            Message::OpenSettings => {
                self.handle_open_settings();
                None
            }
            Message::DismissAlert => {
                self.handle_dismiss_alert();
                None
            }
            Message::CycleAlertFocus => {
                if let Some(alert) = self.alert.as_mut() {
                    alert.focused = alert.focused.next();
                }
                None
            }
            Message::ActivateAlertFocus => {
                match self.alert.as_ref().map(|a| a.focused) {
                    Some(AlertButton::OpenSettings) => self.handle_open_settings(),
                    Some(AlertButton::Cancel) => self.handle_dismiss_alert(),
                    None => {}
                }
                None
            }
            Message::Quit => {
                self.should_quit = true;
                None
            }
        }
    }

    fn handle_toggle_scanning(&mut self) -> Option<JoinHandle<()>> {
        let (active, phase) = {
            let snapshot = self.snapshot.borrow();
            (snapshot.is_active(), snapshot.phase)
        };

        if active || phase == ScannerPhase::RequestingPermission {
            info!("Pausing scanner");
            self.controller.stop_scanning();
            None
        } else {
            info!("Starting scanner");
            Some(self.spawn_start())
        }
    }

    fn handle_reset(&mut self) -> Option<JoinHandle<()>> {
        info!("Resetting scanner");
        let controller = self.controller.clone();
        Some(self.runtime.spawn(async move { controller.reset().await }))
    }

    fn handle_open_settings(&mut self) {
        match self.settings.open_settings() {
            Ok(()) => self.status = Some("Opened system settings".to_string()),
            Err(e) => {
                error!(error = %e, "Failed to open system settings");
                self.status = Some(format!("Error: {}", e));
            }
        }
        self.handle_dismiss_alert();
    }

    fn handle_dismiss_alert(&mut self) {
        self.alert = None;
        self.controller.dismiss_permission_alert();
    }
}

/// Map a key press to a message. While the alert is open only its keys apply.
pub fn key_to_message(key: KeyEvent, alert_open: bool) -> Option<Message> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Message::Quit);
    }

    if alert_open {
        return match key.code {
            KeyCode::Char('o') => Some(Message::OpenSettings),
            KeyCode::Esc | KeyCode::Char('c') => Some(Message::DismissAlert),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                Some(Message::CycleAlertFocus)
            }
            KeyCode::Enter => Some(Message::ActivateAlertFocus),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('s') => Some(Message::ToggleScanning),
        KeyCode::Char('r') => Some(Message::Reset),
        KeyCode::Char('q') => Some(Message::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_scanner_keys() {
        assert_eq!(
            key_to_message(press(KeyCode::Char(' ')), false),
            Some(Message::ToggleScanning)
        );
        assert_eq!(
            key_to_message(press(KeyCode::Char('r')), false),
            Some(Message::Reset)
        );
        assert_eq!(key_to_message(press(KeyCode::Char('x')), false), None);
    }

    #[test]
    fn test_alert_captures_keys() {
        assert_eq!(key_to_message(press(KeyCode::Char('r')), true), None);
        assert_eq!(
            key_to_message(press(KeyCode::Esc), true),
            Some(Message::DismissAlert)
        );
        assert_eq!(
            key_to_message(press(KeyCode::Char('o')), true),
            Some(Message::OpenSettings)
        );
        assert_eq!(
            key_to_message(press(KeyCode::Tab), true),
            Some(Message::CycleAlertFocus)
        );
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_message(key, true), Some(Message::Quit));
        assert_eq!(key_to_message(key, false), Some(Message::Quit));
    }
}
