// SPDX-License-Identifier: MPL-2.0

//! Frame analysis
//!
//! Camera frames are sampled by the scanner's decode loop and run through
//! the QR detector.

pub mod qr_detector;
pub mod types;

pub use qr_detector::QrDetector;
pub use types::{FrameRegion, QrDetection};
