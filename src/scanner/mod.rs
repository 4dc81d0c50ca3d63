// SPDX-License-Identifier: GPL-3.0-only

//! Scanning session lifecycle
//!
//! The [`ScannerController`] is the single writer of [`ScannerSnapshot`];
//! views read it through a `watch` receiver and react to [`ScannerEvent`]s.

pub mod controller;
mod decode_loop;
pub mod state;

pub use controller::{ScannerController, ScannerOptions};
pub use state::{CaptureHandle, Detection, ScannerEvent, ScannerPhase, ScannerSnapshot};
