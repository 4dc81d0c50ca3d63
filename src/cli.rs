// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Running the terminal scanner screen
//! - Listing available cameras
//! - Headless scanning
//! - Decoding image files

use barcode_scanner::app::AppModel;
use barcode_scanner::backends::camera::pipewire::{
    PipeWireCapture, enumerate_pipewire_cameras, get_pipewire_formats,
};
use barcode_scanner::backends::permission::{
    PermissionProvider, PermissionState, PortalPermission, StaticPermission,
};
use barcode_scanner::backends::settings::DesktopSettings;
use barcode_scanner::config::Config;
use barcode_scanner::constants::APP_ID;
use barcode_scanner::errors::{AppError, CameraError, PermissionError};
use barcode_scanner::frame_processor::QrDetector;
use barcode_scanner::scanner::{ScannerController, ScannerEvent, ScannerOptions};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Run the interactive scanner screen
pub fn run_terminal(
    camera_index: Option<usize>,
    no_portal: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let mut config = Config::load();
    let controller = build_controller(&mut config, camera_index, no_portal)?;
    let settings = Arc::new(DesktopSettings::from_config(&config));

    let runtime = tokio::runtime::Runtime::new()?;
    let model = AppModel::new(
        controller,
        settings,
        runtime.handle().clone(),
        config.mirror_preview,
    );

    barcode_scanner::terminal::run(model)
}

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = enumerate_pipewire_cameras().unwrap_or_default();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);

        let formats = get_pipewire_formats(camera);
        if !formats.is_empty() {
            // Best framerate per resolution
            let mut resolutions: Vec<(u32, u32, u32)> = Vec::new();
            for format in &formats {
                let fps = format.framerate.map(|f| f.as_int()).unwrap_or(30);
                if let Some(existing) = resolutions
                    .iter_mut()
                    .find(|(w, h, _)| *w == format.width && *h == format.height)
                {
                    existing.2 = existing.2.max(fps);
                } else {
                    resolutions.push((format.width, format.height, fps));
                }
            }

            resolutions.sort_by(|a, b| (b.0 * b.1).cmp(&(a.0 * a.1)));

            let res_strs: Vec<String> = resolutions
                .iter()
                .take(3)
                .map(|(w, h, fps)| format!("{}x{}@{}fps", w, h, fps))
                .collect();

            println!("      Formats: {}", res_strs.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Scan until the first code is decoded and print it
pub fn scan(
    camera_index: Option<usize>,
    timeout_secs: u64,
    no_portal: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let mut config = Config::load();
    let controller = build_controller(&mut config, camera_index, no_portal)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let value = runtime.block_on(scan_once(
        &controller,
        Duration::from_secs(timeout_secs),
    ))?;
    println!("{}", value);
    Ok(())
}

async fn scan_once(controller: &ScannerController, timeout: Duration) -> Result<String, AppError> {
    let mut events = controller.events();
    controller.start_scanning().await;

    let snapshot = controller.snapshot();
    if snapshot.permission_denied {
        return Err(PermissionError::Denied(snapshot.denied_message).into());
    }
    if !snapshot.is_active() {
        return Err(AppError::Camera(CameraError::BackendError(
            "Capture did not start".to_string(),
        )));
    }
    eprintln!("Scanning... (timeout {}s)", timeout.as_secs());

    let detected = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(ScannerEvent::Detected(value)) => return Some(value),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed scanner events"),
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .await;

    controller.stop_scanning();

    match detected {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(AppError::Other("Scanner stopped unexpectedly".to_string())),
        Err(_) => Err(AppError::Other(format!(
            "No code detected within {}s",
            timeout.as_secs()
        ))),
    }
}

/// Decode QR codes in an image file and print their contents
pub fn decode_image(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(path).map_err(AppError::from)?;
    let detections = QrDetector::new().detect_image(&image);

    if detections.is_empty() {
        return Err(format!("No QR code found in {}", path.display()).into());
    }

    for detection in detections {
        println!("{}", detection.content);
    }
    Ok(())
}

/// Build a controller for the selected camera.
///
/// An explicit index is remembered as the preferred camera for later runs.
fn build_controller(
    config: &mut Config,
    camera_index: Option<usize>,
    no_portal: bool,
) -> Result<ScannerController, AppError> {
    let capture = match camera_index {
        Some(index) => {
            let cameras = enumerate_pipewire_cameras().unwrap_or_default();
            if cameras.is_empty() {
                return Err(CameraError::NoCameraFound.into());
            }
            let device = cameras
                .get(index)
                .cloned()
                .ok_or(CameraError::IndexOutOfRange {
                    index,
                    available: cameras.len(),
                })?;
            info!(name = %device.name, path = %device.path, "Using selected camera");

            if config.last_camera_path.as_deref() != Some(device.path.as_str()) {
                config.last_camera_path = Some(device.path.clone());
                if let Err(e) = config.save() {
                    warn!(error = %e, "Failed to remember camera selection");
                }
            }
            PipeWireCapture::with_device(device)
        }
        None => PipeWireCapture::new(config.last_camera_path.clone()),
    };

    let permission: Arc<dyn PermissionProvider> = if no_portal {
        Arc::new(StaticPermission(PermissionState::Granted))
    } else {
        Arc::new(PortalPermission::new())
    };

    Ok(ScannerController::new(
        Box::new(capture),
        permission,
        ScannerOptions::from_config(config),
    ))
}

/// Log file for the terminal screen, in the user cache directory
pub fn open_log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join(APP_ID);
    std::fs::create_dir_all(&dir).ok()?;
    File::create(dir.join("scanner.log")).ok()
}
