// SPDX-License-Identifier: GPL-3.0-only

//! Test doubles shared by the integration tests

#![allow(dead_code)]

use barcode_scanner::backends::camera::{
    BackendError, BackendResult, CameraFrame, CaptureSource, FrameSender,
};
use barcode_scanner::backends::permission::{PermissionProvider, PermissionState};
use barcode_scanner::backends::settings::SettingsNavigator;
use barcode_scanner::errors::{AppError, AppResult};
use barcode_scanner::scanner::{ScannerController, ScannerOptions};
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use tokio::sync::Notify;

/// Observable state of a [`FakeCapture`]
#[derive(Default)]
pub struct CameraMonitor {
    pub running: AtomicBool,
    /// Calls to `start`, including ones still blocked or failing
    pub attempts: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub fail_start: AtomicBool,
    sender: Mutex<Option<FrameSender>>,
    /// While `true`, `start` blocks like a slow device open
    hold: Mutex<bool>,
    released: Condvar,
}

impl CameraMonitor {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make subsequent starts block until [`release_start`](Self::release_start)
    pub fn hold_start(&self) {
        *self.hold.lock().unwrap() = true;
    }

    pub fn release_start(&self) {
        *self.hold.lock().unwrap() = false;
        self.released.notify_all();
    }

    fn wait_for_release(&self) {
        let mut held = self.hold.lock().unwrap();
        while *held {
            held = self.released.wait(held).unwrap();
        }
    }

    /// Deliver a frame as the camera's streaming thread would
    pub fn push_frame(&self, frame: CameraFrame) -> bool {
        match self.sender.lock().unwrap().as_mut() {
            Some(sender) => sender.try_send(frame).is_ok(),
            None => false,
        }
    }
}

/// Capture source that streams only what the test pushes
pub struct FakeCapture {
    camera: Arc<CameraMonitor>,
}

impl FakeCapture {
    pub fn new() -> (Self, Arc<CameraMonitor>) {
        let camera = Arc::new(CameraMonitor::default());
        (
            Self {
                camera: Arc::clone(&camera),
            },
            camera,
        )
    }
}

impl CaptureSource for FakeCapture {
    fn start(&mut self, frames: FrameSender) -> BackendResult<()> {
        self.camera.attempts.fetch_add(1, Ordering::SeqCst);
        self.camera.wait_for_release();
        if self.camera.fail_start.load(Ordering::SeqCst) {
            return Err(BackendError::DeviceNotFound("fake camera unplugged".into()));
        }
        self.camera.starts.fetch_add(1, Ordering::SeqCst);
        self.camera.running.store(true, Ordering::SeqCst);
        *self.camera.sender.lock().unwrap() = Some(frames);
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        if self.camera.running.swap(false, Ordering::SeqCst) {
            self.camera.stops.fetch_add(1, Ordering::SeqCst);
        }
        self.camera.sender.lock().unwrap().take();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.camera.is_running()
    }

    fn device_name(&self) -> String {
        "Fake Camera".to_string()
    }
}

/// Permission provider with a settable answer and an optional gate
pub struct FakePermission {
    answer: Mutex<PermissionState>,
    current: Mutex<PermissionState>,
    gate: Option<Arc<Notify>>,
    pub requests: AtomicUsize,
}

impl FakePermission {
    pub fn answering(answer: PermissionState) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(answer),
            current: Mutex::new(PermissionState::NotDetermined),
            gate: None,
            requests: AtomicUsize::new(0),
        })
    }

    /// Requests block until the returned `Notify` is signalled
    pub fn gated(answer: PermissionState) -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let permission = Arc::new(Self {
            answer: Mutex::new(answer),
            current: Mutex::new(PermissionState::NotDetermined),
            gate: Some(Arc::clone(&gate)),
            requests: AtomicUsize::new(0),
        });
        (permission, gate)
    }

    pub fn set_answer(&self, answer: PermissionState) {
        *self.answer.lock().unwrap() = answer;
    }
}

impl PermissionProvider for FakePermission {
    fn status(&self) -> PermissionState {
        *self.current.lock().unwrap()
    }

    fn request(&self) -> BoxFuture<'_, PermissionState> {
        Box::pin(async move {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let answer = *self.answer.lock().unwrap();
            *self.current.lock().unwrap() = answer;
            answer
        })
    }
}

/// Settings navigator counting how often it was opened
#[derive(Default)]
pub struct FakeSettings {
    pub opened: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeSettings {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl SettingsNavigator for FakeSettings {
    fn open_settings(&self) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Settings("no settings app".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Controller over a fake camera with the given permission answer
pub fn controller_with(
    permission: Arc<FakePermission>,
    options: ScannerOptions,
) -> (ScannerController, Arc<CameraMonitor>) {
    let (capture, camera) = FakeCapture::new();
    (
        ScannerController::new(Box::new(capture), permission, options),
        camera,
    )
}

pub fn granted_controller() -> (ScannerController, Arc<CameraMonitor>) {
    controller_with(
        FakePermission::answering(PermissionState::Granted),
        ScannerOptions::default(),
    )
}

/// Payload encoded in `tests/assets/abc123.png`
pub const FIXTURE_PAYLOAD: &str = "ABC123";

pub fn asset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("assets")
        .join(name)
}

/// The QR fixture as an RGBA camera frame, as the capture pipeline delivers it
pub fn qr_frame() -> CameraFrame {
    let image = image::open(asset("abc123.png")).unwrap().to_rgba8();
    let (width, height) = image.dimensions();
    CameraFrame::from_rgba(width, height, image.into_raw())
}
