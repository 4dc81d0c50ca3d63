// SPDX-License-Identifier: MPL-2.0

//! Platform backends: camera capture, camera permission and settings navigation

pub mod camera;
pub mod permission;
pub mod settings;
