// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application identifier (used for config/cache directories and portal tokens)
pub const APP_ID: &str = "barcode-scanner";

/// Human readable application name
pub const APP_NAME: &str = "Barcode Scanner";

/// User-facing strings shown by the scanner view
pub mod text {
    /// Shown in place of the live preview while no session is running
    pub const PREVIEW_PLACEHOLDER: &str = "Camera preview will appear here";

    /// Shown while a session is running but no frame has arrived yet
    pub const WAITING_FOR_CAMERA: &str = "Waiting for camera...";

    /// Heading above the last decoded value
    pub const SCANNED_VALUE_LABEL: &str = "Scanned value:";

    /// Title of the permission-denied alert
    pub const ACCESS_REQUIRED_TITLE: &str = "Camera Access Required";

    /// Message published alongside the permission-denied flag
    pub const ACCESS_DENIED_MESSAGE: &str = "Camera access was denied. Allow this application to use the camera in the system privacy settings, then start scanning again.";

    /// Primary alert button
    pub const OPEN_SETTINGS: &str = "Open Settings";

    /// Secondary alert button
    pub const CANCEL: &str = "Cancel";
}

/// QR detection tuning
pub mod detection {
    /// Frames are downscaled so that their larger side is at most this many pixels
    pub const DEFAULT_MAX_DIMENSION: u32 = 640;

    /// Minimum time between two detection passes on the live stream
    pub const DEFAULT_DECODE_INTERVAL_MS: u64 = 150;
}

/// Preview stream constants
pub mod preview {
    /// Preferred capture width for scanning (high resolution isn't useful)
    pub const TARGET_WIDTH: u32 = 640;

    /// Preferred capture height for scanning
    pub const TARGET_HEIGHT: u32 = 480;

    /// Frame channel capacity between the streaming thread and the decode loop
    pub const DEFAULT_FRAME_CHANNEL_CAPACITY: usize = 4;
}

/// Video format constants
pub mod formats {
    /// Common frame rates to try when exact enumeration fails
    pub const COMMON_FRAMERATES: &[u32] = &[30, 15];

    /// Resolutions offered when PipeWire cannot be queried
    pub const FALLBACK_RESOLUTIONS: &[(u32, u32)] = &[(1280, 720), (640, 480)];
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Terminal input poll interval (also bounds the redraw rate)
    pub const UI_POLL_INTERVAL: Duration = Duration::from_millis(16);

    /// Default timeout for the headless `scan` command
    pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;
}

/// Desktop settings applications tried, in order, by the settings navigator.
///
/// Each entry is `(program, argument)`; an empty argument launches the program bare.
pub const DEFAULT_SETTINGS_COMMANDS: &[(&str, &str)] = &[
    ("cosmic-settings", ""),
    ("gnome-control-center", "privacy"),
    ("systemsettings", "kcm_camera"),
];
