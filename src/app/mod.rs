// SPDX-License-Identifier: GPL-3.0-only

//! Scanner screen
//!
//! A live preview, the last scanned value, Start/Pause and Reset controls,
//! and a modal shown when camera access is denied. All scanning state comes
//! from the [`ScannerController`](crate::scanner::ScannerController).

pub mod alert;
pub mod camera_preview;
pub mod state;
mod update;
pub mod view;

pub use state::{AlertButton, AppModel, Message, PermissionAlert};
pub use update::key_to_message;
pub use view::draw;
