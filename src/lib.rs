// SPDX-License-Identifier: MPL-2.0

//! Barcode Scanner - scan QR codes from a live camera feed
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`scanner`]: Scanning session lifecycle and published state
//! - [`backends`]: Camera capture, camera permission and system settings
//! - [`frame_processor`]: QR detection on camera frames and still images
//! - [`app`]: Scanner screen model, messages and widgets
//! - [`terminal`]: Terminal front end driving the scanner screen
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let controller = ScannerController::new(capture, permission, ScannerOptions::default());
//! let mut events = controller.events();
//! controller.start_scanning().await;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frame_processor;
pub mod scanner;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use frame_processor::{QrDetection, QrDetector};
pub use scanner::{ScannerController, ScannerEvent, ScannerOptions, ScannerSnapshot};
