// SPDX-License-Identifier: MPL-2.0

//! Error types for the scanner application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Camera permission errors
    Permission(PermissionError),
    /// Failed to open the system settings
    Settings(String),
    /// Configuration errors
    Config(String),
    /// Errors while decoding a still image
    Detection(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// No camera devices found
    NoCameraFound,
    /// Requested camera index does not exist
    IndexOutOfRange { index: usize, available: usize },
    /// Backend error (e.g., PipeWire)
    BackendError(String),
}

/// Errors raised while asking for camera access
#[derive(Debug, Clone)]
pub enum PermissionError {
    /// No xdg-desktop-portal reachable on the session bus
    PortalUnavailable(String),
    /// The portal answered with something we could not interpret
    Protocol(String),
    /// The user refused camera access
    Denied(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Settings(msg) => write!(f, "Could not open settings: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Detection(msg) => write!(f, "Detection error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::IndexOutOfRange { index, available } => write!(
                f,
                "Camera index {} out of range ({} available)",
                index, available
            ),
            CameraError::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::PortalUnavailable(msg) => write!(f, "Portal unavailable: {}", msg),
            PermissionError::Protocol(msg) => write!(f, "Unexpected portal reply: {}", msg),
            PermissionError::Denied(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for PermissionError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<crate::backends::camera::BackendError> for AppError {
    fn from(err: crate::backends::camera::BackendError) -> Self {
        AppError::Camera(CameraError::BackendError(err.to_string()))
    }
}

impl From<zbus::Error> for PermissionError {
    fn from(err: zbus::Error) -> Self {
        PermissionError::PortalUnavailable(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Detection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_error_wraps_into_app_error() {
        let err: AppError = CameraError::IndexOutOfRange {
            index: 3,
            available: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Camera error: Camera index 3 out of range (1 available)"
        );
    }

    #[test]
    fn test_string_conversion_is_other() {
        let err: AppError = "boom".into();
        assert!(matches!(err, AppError::Other(ref m) if m == "boom"));
    }
}
