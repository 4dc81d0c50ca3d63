// SPDX-License-Identifier: GPL-3.0-only

//! Published scanner state

use crate::backends::camera::CameraFrame;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Lifecycle phase of the scanner
///
/// `Idle → RequestingPermission → {Scanning | Denied}`, `Scanning → Idle` on stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerPhase {
    #[default]
    Idle,
    RequestingPermission,
    Scanning,
    Denied,
}

/// Handle to a running capture session, renderable as a live preview
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    id: Uuid,
    started_at: DateTime<Local>,
    device_name: String,
    frames: watch::Receiver<Option<Arc<CameraFrame>>>,
}

impl CaptureHandle {
    pub(crate) fn new(
        device_name: String,
        frames: watch::Receiver<Option<Arc<CameraFrame>>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Local::now(),
            device_name,
            frames,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Most recent frame delivered by the camera, if any yet
    pub fn latest_frame(&self) -> Option<Arc<CameraFrame>> {
        self.frames.borrow().clone()
    }

    /// Subscribe to preview frames of this session
    pub fn frames(&self) -> watch::Receiver<Option<Arc<CameraFrame>>> {
        self.frames.clone()
    }
}

impl PartialEq for CaptureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// The last decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub value: String,
    pub detected_at: DateTime<Local>,
}

impl Detection {
    pub fn new(value: String) -> Self {
        Self {
            value,
            detected_at: Local::now(),
        }
    }
}

/// Snapshot of everything the controller publishes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannerSnapshot {
    pub phase: ScannerPhase,
    /// Present only while a capture session is running
    pub session: Option<CaptureHandle>,
    pub detection: Option<Detection>,
    pub permission_denied: bool,
    pub denied_message: String,
}

impl ScannerSnapshot {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn last_detected(&self) -> Option<&str> {
        self.detection.as_ref().map(|d| d.value.as_str())
    }
}

/// Notifications emitted by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
    SessionStarted { id: Uuid },
    SessionStopped { id: Uuid },
    Detected(String),
    PermissionDenied { message: String },
}
