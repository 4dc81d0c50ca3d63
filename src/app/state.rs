// SPDX-License-Identifier: GPL-3.0-only

//! View state for the scanner screen

use crate::backends::settings::SettingsNavigator;
use crate::constants::text;
use crate::scanner::{ScannerController, ScannerEvent, ScannerSnapshot};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// User intents dispatched to [`AppModel::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Start scanning if idle, pause otherwise
    ToggleScanning,
    /// Clear the last value and restart scanning
    Reset,
    /// Alert primary action
    OpenSettings,
    /// Alert secondary action
    DismissAlert,
    /// Move focus between the alert buttons
    CycleAlertFocus,
    /// Trigger the focused alert button
    ActivateAlertFocus,
    Quit,
}

/// Buttons of the permission alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertButton {
    #[default]
    OpenSettings,
    Cancel,
}

impl AlertButton {
    pub fn label(&self) -> &'static str {
        match self {
            AlertButton::OpenSettings => text::OPEN_SETTINGS,
            AlertButton::Cancel => text::CANCEL,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            AlertButton::OpenSettings => AlertButton::Cancel,
            AlertButton::Cancel => AlertButton::OpenSettings,
        }
    }
}

/// Modal shown when camera access was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionAlert {
    pub title: &'static str,
    pub message: String,
    pub focused: AlertButton,
}

impl PermissionAlert {
    pub fn new(message: String) -> Self {
        Self {
            title: text::ACCESS_REQUIRED_TITLE,
            message,
            focused: AlertButton::default(),
        }
    }
}

/// The scanner screen
///
/// Whether scanning is active is always read from the controller's published
/// session; the view keeps no flag of its own.
pub struct AppModel {
    pub(crate) controller: ScannerController,
    pub(crate) settings: Arc<dyn SettingsNavigator>,
    pub(crate) runtime: Handle,
    pub(crate) snapshot: watch::Receiver<ScannerSnapshot>,
    pub(crate) events: broadcast::Receiver<ScannerEvent>,
    pub(crate) alert: Option<PermissionAlert>,
    pub(crate) status: Option<String>,
    pub(crate) mirror_preview: bool,
    pub(crate) should_quit: bool,
    appeared: bool,
}

impl AppModel {
    pub fn new(
        controller: ScannerController,
        settings: Arc<dyn SettingsNavigator>,
        runtime: Handle,
        mirror_preview: bool,
    ) -> Self {
        let snapshot = controller.subscribe();
        let events = controller.events();
        Self {
            controller,
            settings,
            runtime,
            snapshot,
            events,
            alert: None,
            status: None,
            mirror_preview,
            should_quit: false,
            appeared: false,
        }
    }

    /// Start scanning the first time the view is shown
    pub fn on_appear(&mut self) -> Option<JoinHandle<()>> {
        if self.appeared {
            return None;
        }
        self.appeared = true;
        debug!("Scanner view appeared");
        Some(self.spawn_start())
    }

    /// Stop scanning when the view goes away
    pub fn on_disappear(&mut self) {
        debug!("Scanner view disappeared");
        self.appeared = false;
        self.controller.stop_scanning();
    }

    pub(crate) fn spawn_start(&self) -> JoinHandle<()> {
        let controller = self.controller.clone();
        self.runtime
            .spawn(async move { controller.start_scanning().await })
    }

    pub fn controller(&self) -> &ScannerController {
        &self.controller
    }

    /// Current controller state
    pub fn snapshot(&self) -> ScannerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Derived from the controller's capture handle
    pub fn is_scanning(&self) -> bool {
        self.snapshot.borrow().is_active()
    }

    pub fn alert(&self) -> Option<&PermissionAlert> {
        self.alert.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn mirror_preview(&self) -> bool {
        self.mirror_preview
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Drain controller notifications into view state
    pub fn poll_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(ScannerEvent::PermissionDenied { message }) => {
                    self.alert = Some(PermissionAlert::new(message));
                }
                Ok(ScannerEvent::SessionStarted { .. }) => {
                    self.status = None;
                }
                Ok(ScannerEvent::Detected(_)) | Ok(ScannerEvent::SessionStopped { .. }) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "View lagged behind scanner events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        // Missed notifications still surface through the published flag
        if self.alert.is_none() {
            let snapshot = self.snapshot.borrow();
            if snapshot.permission_denied {
                self.alert = Some(PermissionAlert::new(snapshot.denied_message.clone()));
            }
        }
    }
}
